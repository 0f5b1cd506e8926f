//! Global application error types.
//!
//! This module defines the error taxonomy shared by the services, the auth
//! middleware and the handlers. Every variant rejects a single request; none
//! is fatal to the process.

use thiserror::Error;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<(String, String)>,
    },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    /// No credential was presented.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Malformed, unverifiable or wrongly-signed token.
    #[error("Invalid token: {message}")]
    TokenInvalid { message: String },

    /// Well-formed token past its expiry; the client should refresh.
    #[error("Token expired")]
    TokenExpired,

    /// Bad email/password combination. Deliberately generic.
    #[error("Invalid email or password")]
    LoginFailed,

    #[error("User is disabled")]
    Disabled,

    /// Valid identity without the required role.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::TokenInvalid {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Builds a validation error from `validator` output, keeping per-field messages.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let details: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    (
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Invalid value".to_string()),
                    )
                })
            })
            .collect();

        let message = details
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join(", ");

        Self::Validation { message, details }
    }
}
