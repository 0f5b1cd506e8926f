//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data and hand it to `auth::service` for the
//! core logic. Errors are rendered by `ServiceError`'s `IntoResponse` impl.

use std::sync::Arc;

use crate::api::common::{ApiResponse, AppJson};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::{Identity, JwtUtils};
use axum::extract::{Extension, Json};
use sqlx::SqlitePool;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ServiceError> {
    let repo = UserRepository::new(&pool);
    let user = AuthService::new(&repo, &jwt_utils).register(payload).await?;

    Ok(Json(ApiResponse::success(user, "User registered successfully")))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ServiceError> {
    let repo = UserRepository::new(&pool);
    let tokens = AuthService::new(&repo, &jwt_utils).login(payload).await?;

    Ok(Json(ApiResponse::success(tokens, "Login successful")))
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    AppJson(payload): AppJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ServiceError> {
    let repo = UserRepository::new(&pool);
    let tokens = AuthService::new(&repo, &jwt_utils)
        .refresh_token(payload)
        .await?;

    Ok(Json(ApiResponse::success(tokens, "Token refreshed")))
}

/// Get current user information, re-read from the database
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<UserInfo>>, ServiceError> {
    let repo = UserRepository::new(&pool);
    let user = AuthService::new(&repo, &jwt_utils)
        .who_am_i(&identity)
        .await?;

    Ok(Json(ApiResponse::success(user, "User retrieved successfully")))
}
