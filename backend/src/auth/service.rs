//! Core business logic for the authentication system.
//!
//! The service holds no state of its own between requests. It reads and
//! writes users only through [`UserStore`] and treats the token codec and
//! password hashing as pure computation.

use chrono::Utc;
use validator::Validate;

use crate::auth::models::*;
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use crate::utils::jwt::{Identity, JwtUtils};
use crate::utils::password::{hash_password, verify_password};

/// Authentication service for registration, login, token refresh and identity lookup
pub struct AuthService<'a> {
    store: &'a dyn UserStore,
    jwt_utils: &'a JwtUtils,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(store: &'a dyn UserStore, jwt_utils: &'a JwtUtils) -> Self {
        AuthService { store, jwt_utils }
    }

    /// Register a new user with the default role.
    ///
    /// The default role is created on first use.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserInfo> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(ServiceError::already_exists("User", &request.email));
        }

        let password_hash = hash_password(&request.password)?;
        let role = self.store.find_or_create_default_role().await?;

        let user = self
            .store
            .create(CreateUser {
                name: request.name,
                email: request.email.clone(),
                password_hash,
                role_id: role.id,
            })
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration of the same email.
                if is_unique_violation(&e) {
                    ServiceError::already_exists("User", &request.email)
                } else {
                    ServiceError::from(e)
                }
            })?;

        tracing::info!(user_id = user.id, "Registered new user");
        Ok(UserInfo::from(&user))
    }

    /// Authenticate a user and issue an access/refresh token pair.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let user = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or(ServiceError::LoginFailed)?;

        if user.is_disabled() {
            return Err(ServiceError::Disabled);
        }

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(ServiceError::LoginFailed);
        }

        self.issue_tokens(&user)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Role and status come from the store, never from the old token.
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> ServiceResult<TokenResponse> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let user_id = self
            .jwt_utils
            .validate_refresh_token(&request.refresh_token)?;

        let user = self.get_user_required(user_id).await?;

        if user.is_disabled() {
            return Err(ServiceError::Disabled);
        }

        self.issue_tokens(&user)
    }

    /// Current view of the authenticated user.
    pub async fn who_am_i(&self, identity: &Identity) -> ServiceResult<UserInfo> {
        let user = self.get_user_required(identity.user_id).await?;
        Ok(UserInfo::from(&user))
    }

    async fn get_user_required(&self, id: i64) -> ServiceResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    fn issue_tokens(&self, user: &User) -> ServiceResult<TokenResponse> {
        let identity = Identity {
            user_id: user.id,
            username: user.name.clone(),
            role: user.role().to_string(),
        };

        let now = Utc::now();
        let access_token = self.jwt_utils.generate_token_at(&identity, now)?;
        let refresh_token = self.jwt_utils.generate_refresh_token_at(user.id, now)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_utils.expires_in_seconds(),
            expires_at: self.jwt_utils.expires_at(now)?,
            user: UserInfo::from(user),
        })
    }
}

fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
