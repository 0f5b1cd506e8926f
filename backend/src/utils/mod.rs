//! Token and password helpers shared by the auth service and middleware.

pub mod jwt;
pub mod password;
