//! Handler functions for role API endpoints.

use crate::api::common::ApiResponse;
use crate::database::models::Role;
use crate::errors::ServiceError;
use crate::repositories::role_repository::RoleRepository;
use axum::extract::{Extension, Json};
use sqlx::SqlitePool;

/// Lists all roles.
#[axum::debug_handler]
pub async fn list_roles(
    Extension(pool): Extension<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<Role>>>, ServiceError> {
    let roles = RoleRepository::new(&pool).get_all_roles().await?;

    Ok(Json(ApiResponse::success(roles, "Roles retrieved successfully")))
}
