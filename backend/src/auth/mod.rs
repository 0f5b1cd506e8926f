//! Authentication module for registration, login, token refresh and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality and the middleware that guards protected routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
