//! Central module for organizing the application's API endpoints.
//!
//! [`router`] assembles every route group under `/api/v1` together with the
//! shared extensions and cross-cutting middleware.

use std::sync::Arc;

use axum::{Extension, Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::auth;
use crate::middleware::{request_id, request_log};
use crate::utils::jwt::JwtUtils;
use common::ApiResponse;

pub mod common;
pub mod role;
pub mod user;

/// Builds the full application router.
pub fn router(pool: SqlitePool, jwt_utils: Arc<JwtUtils>, debug: bool) -> Router {
    let api = Router::new()
        .nest("/auth", auth::routes::auth_router())
        .nest("/users", user::routes::user_router())
        .nest("/roles", role::routes::role_router());

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api);

    if debug {
        app = app.layer(middleware::from_fn(request_log));
    }

    app.layer(middleware::from_fn(request_id))
        .layer(Extension(pool))
        .layer(Extension(jwt_utils))
}

async fn root_handler() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(
        json!({
            "service": "Template Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the Template Backend API",
    ))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
