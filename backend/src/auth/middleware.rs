//! Middleware for protecting authenticated routes and handling authorization.
//!
//! [`jwt_auth`] validates the bearer token and stores the caller's
//! [`Identity`] in the request extensions. [`require_role`] runs after it and
//! checks that identity against a per-route [`RoleGate`] allow-list.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::{Identity, JwtUtils};

/// JWT authentication middleware
pub async fn jwt_auth(
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = bearer_token(request.headers())?;

    let identity = jwt_utils.validate_token(token).inspect_err(|e| {
        if let ServiceError::TokenInvalid { message } = e {
            tracing::warn!("Invalid token: {}", message);
        }
    })?;

    // Add identity to request extensions for use in handlers
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> ServiceResult<&str> {
    let header = match headers.get(AUTHORIZATION) {
        None => return Err(ServiceError::unauthorized("Authorization header is required")),
        Some(value) if value.is_empty() => {
            return Err(ServiceError::unauthorized("Authorization header is required"));
        }
        Some(value) => value
            .to_str()
            .map_err(|_| ServiceError::token_invalid("Authorization header is not valid text"))?,
    };

    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(ServiceError::token_invalid(
            "Authorization format must be Bearer {token}",
        ));
    }

    Ok(parts[1])
}

/// Allow-list of role names for a group of routes.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed: Arc<[String]>,
}

impl RoleGate {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive match.
    pub fn allows(&self, role: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == role)
    }
}

/// Role authorization middleware. Must be layered inside [`jwt_auth`].
pub async fn require_role(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| ServiceError::unauthorized("Authentication required"))?;

    if !gate.allows(&identity.role) {
        tracing::debug!(
            user_id = identity.user_id,
            role = %identity.role,
            "Role not allowed for route"
        );
        return Err(ServiceError::permission_denied("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
    };
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    fn jwt() -> Arc<JwtUtils> {
        Arc::new(
            JwtUtils::new(&JwtConfig {
                secret: "middleware-test-secret".to_string(),
                issuer: "template-backend-test".to_string(),
                expires_in_seconds: 900,
                refresh_expires_in_seconds: 86400,
            })
            .unwrap(),
        )
    }

    fn token_for(jwt: &JwtUtils, role: &str) -> String {
        jwt.generate_token(&Identity {
            user_id: 1,
            username: "Ann".to_string(),
            role: role.to_string(),
        })
        .unwrap()
    }

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        format!("{}:{}", identity.user_id, identity.role)
    }

    fn app(jwt: Arc<JwtUtils>) -> Router {
        Router::new()
            .route("/me", get(whoami).layer(middleware::from_fn(jwt_auth)))
            .route(
                "/admin",
                get(whoami)
                    .layer(middleware::from_fn_with_state(
                        RoleGate::new(["admin"]),
                        require_role,
                    ))
                    .layer(middleware::from_fn(jwt_auth)),
            )
            .route(
                "/gate-only",
                get(whoami).layer(middleware::from_fn_with_state(
                    RoleGate::new(["admin"]),
                    require_role,
                )),
            )
            .layer(Extension(jwt))
    }

    async fn call(app: Router, uri: &str, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn error_type(body: &[u8]) -> String {
        let value: Value = serde_json::from_slice(body).unwrap();
        value["error"]["error_type"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let (status, body) = call(app(jwt()), "/me", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_type(&body), "user.unauthorized");
    }

    #[tokio::test]
    async fn test_malformed_headers_are_invalid() {
        for header in ["Bearer", "Basic abc", "Bearer a b", "bearer abc", "Bearer "] {
            let (status, body) = call(app(jwt()), "/me", Some(header)).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
            assert_eq!(error_type(&body), "auth.token.invalid", "header {:?}", header);
        }
    }

    #[tokio::test]
    async fn test_valid_token_sets_identity() {
        let jwt = jwt();
        let token = token_for(&jwt, "user");

        let (status, body) = call(app(jwt), "/me", Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"1:user");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let jwt = jwt();
        let identity = Identity {
            user_id: 1,
            username: "Ann".to_string(),
            role: "user".to_string(),
        };
        let token = jwt
            .generate_token_at(&identity, Utc::now() - Duration::hours(1))
            .unwrap();

        let (status, body) = call(app(jwt), "/me", Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_type(&body), "auth.token.expired");
    }

    #[tokio::test]
    async fn test_role_gate() {
        let jwt = jwt();
        let user_token = token_for(&jwt, "user");
        let admin_token = token_for(&jwt, "admin");

        let (status, body) = call(
            app(jwt.clone()),
            "/admin",
            Some(&format!("Bearer {}", user_token)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_type(&body), "auth.access.denied");

        let (status, body) = call(app(jwt), "/admin", Some(&format!("Bearer {}", admin_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"1:admin");
    }

    #[tokio::test]
    async fn test_role_gate_without_token_stage() {
        let jwt = jwt();
        let admin_token = token_for(&jwt, "admin");

        let (status, body) = call(
            app(jwt),
            "/gate-only",
            Some(&format!("Bearer {}", admin_token)),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_type(&body), "user.unauthorized");
    }

    #[test]
    fn test_role_gate_is_exact_match() {
        let gate = RoleGate::new(["admin", "editor"]);

        assert!(gate.allows("admin"));
        assert!(gate.allows("editor"));
        assert!(!gate.allows("Admin"));
        assert!(!gate.allows("user"));
        assert!(!gate.allows(""));
    }
}
