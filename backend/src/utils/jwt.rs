//! JWT token utilities for authentication and authorization.
//!
//! Provides token creation and validation for access and refresh tokens.
//! Access tokens carry the caller's [`Identity`]; refresh tokens carry only
//! the user ID in `sub`, so role and status are always re-read on refresh.
//!
//! Tokens are signed with HS256 and only the HMAC family is accepted on
//! verification, whatever the `alg` header claims. There is no leeway:
//! `nbf == iat == now`, so a verifier whose clock lags the issuer may reject
//! a freshly issued token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::errors::{ServiceError, ServiceResult};

/// Identity of an authenticated caller, as embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

/// Access token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expiration
    pub exp: i64,
}

/// Refresh token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// User ID as a decimal string
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_validation: Validation,
    refresh_validation: Validation,
    issuer: String,
    expires_in: Duration,
    refresh_expires_in: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the JWT settings.
    ///
    /// Fails when the secret is empty rather than signing with an empty key.
    pub fn new(config: &JwtConfig) -> ServiceResult<Self> {
        if config.secret.is_empty() {
            return Err(ServiceError::validation("JWT secret must not be empty"));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(JwtUtils {
            encoding_key,
            decoding_key,
            access_validation: hmac_validation(&["exp", "nbf", "iss"]),
            refresh_validation: hmac_validation(&["exp", "nbf", "iss", "sub"]),
            issuer: config.issuer.clone(),
            expires_in: lifetime(config.expires_in_seconds)?,
            refresh_expires_in: lifetime(config.refresh_expires_in_seconds)?,
        })
    }

    /// Access token lifetime in seconds.
    pub fn expires_in_seconds(&self) -> u64 {
        self.expires_in.num_seconds() as u64
    }

    /// Expiry of an access token issued at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> ServiceResult<DateTime<Utc>> {
        expiry(now, self.expires_in)
    }

    /// Generate an access token for the given identity.
    pub fn generate_token(&self, identity: &Identity) -> ServiceResult<String> {
        self.generate_token_at(identity, Utc::now())
    }

    /// Generate an access token as if issued at `now`.
    pub fn generate_token_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> ServiceResult<String> {
        let claims = Claims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            role: identity.role.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: self.expires_at(now)?.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Generate a refresh token (longer expiration, subject only).
    ///
    /// The username is accepted for call-site symmetry but never embedded.
    pub fn generate_refresh_token(&self, user_id: i64, _username: &str) -> ServiceResult<String> {
        self.generate_refresh_token_at(user_id, Utc::now())
    }

    /// Generate a refresh token as if issued at `now`.
    pub fn generate_refresh_token_at(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> ServiceResult<String> {
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiry(now, self.refresh_expires_in)?.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            ServiceError::internal_error(format!("Refresh token generation failed: {}", e))
        })
    }

    /// Validate and decode an access token into the caller's identity.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Identity> {
        decode::<Claims>(token, &self.decoding_key, &self.access_validation)
            .map(|token_data| token_data.claims.identity())
            .map_err(token_error)
    }

    /// Validate a refresh token and return the user ID it was issued for.
    pub fn validate_refresh_token(&self, token: &str) -> ServiceResult<i64> {
        let claims = decode::<RefreshClaims>(token, &self.decoding_key, &self.refresh_validation)
            .map(|token_data| token_data.claims)
            .map_err(token_error)?;

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| ServiceError::token_invalid("Refresh token subject is not a user ID"))
    }
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

fn lifetime(seconds: u64) -> ServiceResult<Duration> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ServiceError::validation("JWT lifetime is out of range"))
}

fn expiry(now: DateTime<Utc>, lifetime: Duration) -> ServiceResult<DateTime<Utc>> {
    now.checked_add_signed(lifetime)
        .ok_or_else(|| ServiceError::internal_error("Token expiry is out of range"))
}

fn hmac_validation(required_claims: &[&str]) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(required_claims);
    validation
}

fn token_error(error: jsonwebtoken::errors::Error) -> ServiceError {
    match error.kind() {
        ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
        _ => ServiceError::token_invalid(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing";

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: "template-backend-test".to_string(),
            expires_in_seconds: 3600,
            refresh_expires_in_seconds: 7 * 24 * 3600,
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: 42,
            username: "Ann".to_string(),
            role: "user".to_string(),
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtUtils::new(&config("")).is_err());
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let token = jwt.generate_token(&identity()).unwrap();

        assert_eq!(jwt.validate_token(&token).unwrap(), identity());
    }

    #[test]
    fn test_expired_token_reports_expired() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let issued = Utc::now() - Duration::hours(2);
        let token = jwt.generate_token_at(&identity(), issued).unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(ServiceError::TokenExpired)
        ));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_invalid() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let other = JwtUtils::new(&config("another-secret")).unwrap();
        let token = other
            .generate_token_at(&identity(), Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let other = JwtUtils::new(&config("wrong-secret-key")).unwrap();
        let token = other.generate_token(&identity()).unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_malformed_token() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();

        assert!(matches!(
            jwt.validate_token("invalid.token.here"),
            Err(ServiceError::TokenInvalid { .. })
        ));
        assert!(matches!(
            jwt.validate_token(""),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let token = jwt.generate_token(&identity()).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(matches!(
            jwt.validate_token(&unsigned),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_asymmetric_alg_headers_rejected() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let access = jwt.generate_token(&identity()).unwrap();
        let refresh = jwt.generate_refresh_token(42, "Ann").unwrap();

        // {"alg":"RS256","typ":"JWT"} and {"alg":"ES256","typ":"JWT"}
        for header in [
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9",
            "eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9",
        ] {
            let reheader = |token: &str| {
                let mut parts = token.splitn(2, '.');
                parts.next();
                format!("{}.{}", header, parts.next().unwrap())
            };

            assert!(matches!(
                jwt.validate_token(&reheader(&access)),
                Err(ServiceError::TokenInvalid { .. })
            ));
            assert!(matches!(
                jwt.validate_refresh_token(&reheader(&refresh)),
                Err(ServiceError::TokenInvalid { .. })
            ));
        }
    }

    #[test]
    fn test_out_of_range_lifetimes() {
        let mut cfg = config(TEST_SECRET);
        cfg.expires_in_seconds = u64::MAX;
        assert!(matches!(
            JwtUtils::new(&cfg),
            Err(ServiceError::Validation { .. })
        ));

        // Representable as a duration, but past the last representable date.
        let mut cfg = config(TEST_SECRET);
        cfg.expires_in_seconds = 100_000_000_000_000;
        cfg.refresh_expires_in_seconds = 100_000_000_000_001;
        let jwt = JwtUtils::new(&cfg).unwrap();
        assert!(matches!(
            jwt.generate_token(&identity()),
            Err(ServiceError::InternalError { .. })
        ));
        assert!(matches!(
            jwt.generate_refresh_token(42, "Ann"),
            Err(ServiceError::InternalError { .. })
        ));
    }

    #[test]
    fn test_other_hmac_variants_accepted() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 7,
            username: "Bob".to_string(),
            role: "admin".to_string(),
            iss: "someone-else".to_string(),
            iat: now,
            nbf: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let identity = jwt.validate_token(&token).unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.role, "admin");
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let token = jwt.generate_refresh_token(42, "Ann").unwrap();

        assert_eq!(jwt.validate_refresh_token(&token).unwrap(), 42);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let refresh = jwt.generate_refresh_token(42, "Ann").unwrap();
        let access = jwt.generate_token(&identity()).unwrap();

        assert!(matches!(
            jwt.validate_token(&refresh),
            Err(ServiceError::TokenInvalid { .. })
        ));
        assert!(matches!(
            jwt.validate_refresh_token(&access),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_refresh_token_expired() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let token = jwt
            .generate_refresh_token_at(42, Utc::now() - Duration::days(8))
            .unwrap();

        assert!(matches!(
            jwt.validate_refresh_token(&token),
            Err(ServiceError::TokenExpired)
        ));
    }

    #[test]
    fn test_refresh_subject_must_be_numeric() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: "not-a-number".to_string(),
            iss: "template-backend-test".to_string(),
            iat: now,
            nbf: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            jwt.validate_refresh_token(&token),
            Err(ServiceError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expires_in_seconds() {
        let jwt = JwtUtils::new(&config(TEST_SECRET)).unwrap();
        assert_eq!(jwt.expires_in_seconds(), 3600);
    }
}
