//! Handler functions for user management API endpoints.

use crate::api::common::{
    ApiResponse, AppJson, AppPath, AppQuery, PaginationFilter, PaginationMeta,
};
use crate::database::models::{User, UserStatus};
use crate::errors::ServiceError;
use crate::services::user_service::UserService;
use crate::utils::jwt::Identity;
use axum::extract::{Extension, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

/// Lists users, paginated.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    AppQuery(pagination): AppQuery<PaginationFilter>,
) -> Result<Json<ApiResponse<Vec<User>>>, ServiceError> {
    let (users, total) = UserService::new(&pool).list_users(&pagination).await?;
    let meta = PaginationMeta::from_filter(&pagination, total);

    Ok(Json(ApiResponse::paginated(
        users,
        meta,
        "Users retrieved successfully",
    )))
}

/// Retrieves a user by its ID.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(pool): Extension<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<User>>, ServiceError> {
    let user = UserService::new(&pool).get_user_required(id).await?;

    Ok(Json(ApiResponse::success(
        user,
        "User retrieved successfully",
    )))
}

/// Enables or disables a user. Admin only.
#[axum::debug_handler]
pub async fn update_user_status(
    Extension(identity): Extension<Identity>,
    Extension(pool): Extension<SqlitePool>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<User>>, ServiceError> {
    tracing::info!(
        "Setting status of user {} to {} by admin {}",
        id,
        payload.status,
        identity.user_id
    );

    let user = UserService::new(&pool)
        .set_user_status(id, payload.status)
        .await?;

    Ok(Json(ApiResponse::success(
        user,
        "User status updated successfully",
    )))
}
