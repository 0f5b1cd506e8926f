//! Business logic that sits between the HTTP handlers and the repositories.

pub mod user_service;
