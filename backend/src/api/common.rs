//! Response envelope and error handling utilities for API responses.
//!
//! Provides structured responses and the conversion between service-layer
//! errors and HTTP responses. Includes:
//! - Standard response format
//! - ServiceError to HTTP status code and error code mapping
//! - Validation error formatting
//! - Pagination support for list endpoints
//! - Input extractors whose rejections use the same error format
//!
//! # Response Format
//! Errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `error.error_type`: Machine-readable error code such as `auth.token.expired`
//! - `error.details`: Optional field-specific validation errors
//!
//! Internal failures are logged and reported as `server.error` without detail.

use crate::errors::ServiceError;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Pagination metadata (present for paginated responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    /// Request timestamp
    pub timestamp: String,
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total_items: u64,
    /// Total number of pages
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u32>,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

/// Pagination parameters for requests
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PaginationFilter {
    /// Page number (1-indexed)
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Number of items per page
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u32>,
}

impl PaginationMeta {
    /// Create pagination metadata from page parameters and total count
    pub fn new(current_page: u32, per_page: u32, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            ((total_items - 1) / per_page as u64 + 1) as u32
        };

        let has_next = current_page < total_pages;
        let has_prev = current_page > 1;

        Self {
            current_page,
            per_page,
            total_items,
            total_pages,
            has_next,
            has_prev,
            next_page: if has_next {
                Some(current_page + 1)
            } else {
                None
            },
            prev_page: if has_prev {
                Some(current_page - 1)
            } else {
                None
            },
        }
    }

    pub fn from_filter(filter: &PaginationFilter, total_items: u64) -> Self {
        Self::new(filter.page(), filter.per_page(), total_items)
    }
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            pagination: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a successful paginated response
    pub fn paginated(data: T, pagination: PaginationMeta, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            pagination: Some(pagination),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(
        message: impl Into<String>,
        error_type: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
                details,
            }),
            pagination: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl PaginationFilter {
    /// Get page number with default
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get per_page with default
    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// Calculate offset for database queries
    pub fn offset(&self) -> u64 {
        (self.page() as u64 - 1) * self.per_page() as u64
    }

    /// Get limit for database queries
    pub fn limit(&self) -> u64 {
        self.per_page() as u64
    }
}

impl Default for PaginationFilter {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(20),
        }
    }
}

/// JSON body extractor; malformed bodies become `invalid.params` errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct AppJson<T>(pub T);

/// Query string extractor with the same rejection format as [`AppJson`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServiceError))]
pub struct AppQuery<T>(pub T);

/// Path parameter extractor with the same rejection format as [`AppJson`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServiceError))]
pub struct AppPath<T>(pub T);

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

/// Maps a service error to its status, error code, message and field details.
fn error_parts(error: ServiceError) -> (StatusCode, String, String, Option<Vec<FieldError>>) {
    match error {
        ServiceError::Validation { message, details } => {
            let details = (!details.is_empty()).then(|| {
                details
                    .into_iter()
                    .map(|(field, message)| FieldError { field, message })
                    .collect()
            });
            (
                StatusCode::BAD_REQUEST,
                "invalid.params".to_string(),
                message,
                details,
            )
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            format!("{}.not_found", entity.to_lowercase()),
            format!("{} '{}' not found", entity, identifier),
            None,
        ),
        ServiceError::AlreadyExists { entity, identifier } => {
            let error_type = if entity == "User" {
                "user.register.error".to_string()
            } else {
                format!("{}.already_exists", entity.to_lowercase())
            };
            (
                StatusCode::CONFLICT,
                error_type,
                format!("{} '{}' already exists", entity, identifier),
                None,
            )
        }
        ServiceError::Unauthorized { message } => (
            StatusCode::UNAUTHORIZED,
            "user.unauthorized".to_string(),
            message,
            None,
        ),
        ServiceError::TokenInvalid { .. } => (
            StatusCode::UNAUTHORIZED,
            "auth.token.invalid".to_string(),
            "Invalid authentication token".to_string(),
            None,
        ),
        ServiceError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "auth.token.expired".to_string(),
            "Authentication token has expired".to_string(),
            None,
        ),
        ServiceError::LoginFailed => (
            StatusCode::UNAUTHORIZED,
            "user.login.error".to_string(),
            "Invalid email or password".to_string(),
            None,
        ),
        ServiceError::Disabled => (
            StatusCode::FORBIDDEN,
            "user.disabled".to_string(),
            "User is disabled".to_string(),
            None,
        ),
        ServiceError::PermissionDenied { message } => (
            StatusCode::FORBIDDEN,
            "auth.access.denied".to_string(),
            message,
            None,
        ),
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            internal_parts()
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            internal_parts()
        }
    }
}

fn internal_parts() -> (StatusCode, String, String, Option<Vec<FieldError>>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "server.error".to_string(),
        "Internal server error".to_string(),
        None,
    )
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = error_parts(self);
        let body = ApiResponse::<()>::error(message, error_type, details);
        (status, Json(body)).into_response()
    }
}
