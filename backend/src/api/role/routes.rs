//! Defines the HTTP routes for roles. Admin only.

use super::handlers::list_roles;
use crate::auth::middleware::{RoleGate, jwt_auth, require_role};
use axum::{Router, middleware, routing::get};

pub fn role_router() -> Router {
    Router::new()
        .route("/", get(list_roles))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::new(["admin"]),
            require_role,
        ))
        .route_layer(middleware::from_fn(jwt_auth))
}
