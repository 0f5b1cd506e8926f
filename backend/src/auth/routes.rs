//! Defines the HTTP routes specifically for authentication.
//!
//! Register, login and refresh are public; `/me` requires an access token.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
