//! User business logic service.
//!
//! Handles user lookups and administrative status changes for the API layer.

use crate::api::common::PaginationFilter;
use crate::database::models::{User, UserStatus};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use sqlx::SqlitePool;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists one page of users along with the total count.
    pub async fn list_users(&self, pagination: &PaginationFilter) -> ServiceResult<(Vec<User>, u64)> {
        pagination
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let repo = UserRepository::new(self.pool);
        let users = repo.list_users(pagination).await?;
        let total = repo.count_users().await?;
        Ok((users, total))
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_required(&self, id: i64) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Enables or disables a user.
    ///
    /// Tokens already issued stay valid until they expire, but refresh and
    /// login are refused while the user is disabled.
    pub async fn set_user_status(&self, id: i64, status: UserStatus) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .set_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        tracing::info!(user_id = id, %status, "User status changed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        assert!(matches!(
            service.get_user_required(1).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.set_user_status(1, UserStatus::Disabled).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_rejects_oversized_page() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);
        let pagination = PaginationFilter {
            page: Some(1),
            per_page: Some(500),
        };

        assert!(matches!(
            service.list_users(&pagination).await,
            Err(ServiceError::Validation { .. })
        ));

        let (users, total) = service.list_users(&PaginationFilter::default()).await.unwrap();
        assert!(users.is_empty());
        assert_eq!(total, 0);
    }
}
