//! Cross-cutting HTTP middleware: request IDs and request logging.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request identifier, available to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuses the caller's `X-Request-ID` or generates one, and echoes it back.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Logs one line per request; level follows the response status.
pub async fn request_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let logged = is_logged(request.uri());
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let response = next.run(request).await;

    if !logged {
        return response;
    }

    let status = response.status().as_u16();
    let latency = start.elapsed();
    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, ?latency, %request_id, "Server error");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, ?latency, %request_id, "Client error");
    } else {
        tracing::debug!(%method, %path, status, ?latency, %request_id, "Request processed");
    }

    response
}

/// `/health` is never logged, whatever the query string.
fn is_logged(uri: &Uri) -> bool {
    uri.path() != "/health"
}
