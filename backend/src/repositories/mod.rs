//! Data access layer.
//!
//! Repositories wrap the SQLite pool. The auth service talks to storage only
//! through [`UserStore`], so it never depends on the concrete database.

use anyhow::Result;
use async_trait::async_trait;

use crate::database::models::{CreateUser, DEFAULT_ROLE, DEFAULT_ROLE_DESCRIPTION, Role, User};

pub mod role_repository;
pub mod user_repository;

use role_repository::RoleRepository;
use user_repository::UserRepository;

/// User persistence required by the authentication flow.
///
/// Lookups return `Ok(None)` for a missing user; `Err` is reserved for
/// storage failures.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn create(&self, user: CreateUser) -> Result<User>;

    /// The role given to newly registered users, created on first use.
    async fn find_or_create_default_role(&self) -> Result<Role>;
}

#[async_trait]
impl UserStore for UserRepository<'_> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id(id).await
    }

    async fn create(&self, user: CreateUser) -> Result<User> {
        self.create_user(user).await
    }

    async fn find_or_create_default_role(&self) -> Result<Role> {
        RoleRepository::new(self.pool())
            .find_or_create_role(DEFAULT_ROLE, DEFAULT_ROLE_DESCRIPTION)
            .await
    }
}
