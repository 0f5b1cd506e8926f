//! Defines the HTTP routes for user management.
//!
//! Reading users needs any valid access token; changing a user's status is
//! restricted to admins.

use super::handlers::{get_user_by_id, list_users, update_user_status};
use crate::auth::middleware::{RoleGate, jwt_auth, require_role};
use axum::{
    Router, middleware,
    routing::{get, put},
};

pub fn user_router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user_by_id))
        .route(
            "/{id}/status",
            put(update_user_status).layer(middleware::from_fn_with_state(
                RoleGate::new(["admin"]),
                require_role,
            )),
        )
        .route_layer(middleware::from_fn(jwt_auth))
}
