//! Database repository for user management operations.
//!
//! Every query joins the user's role so callers always see the current role
//! name alongside the row.

use crate::{
    api::common::PaginationFilter,
    database::models::{CreateUser, User, UserStatus},
};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_SELECT: &str = r#"
    SELECT
    u.id, u.name, u.email, u.password_hash, u.status, u.role_id,
    r.name AS role_name,
    u.created_at, u.updated_at
    FROM users u
    LEFT JOIN roles r ON u.role_id = r.id
"#;

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity,
/// maintaining the relationship with roles.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &'a SqlitePool {
        self.pool
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO containing user details
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, status, role_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(UserStatus::Active)
        .bind(user.role_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {} missing after insert", id))
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{} WHERE u.id = ?", USER_SELECT))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{} WHERE u.email = ?", USER_SELECT))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves one page of users, oldest first.
    pub async fn list_users(&self, pagination: &PaginationFilter) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "{} ORDER BY u.id LIMIT ? OFFSET ?",
            USER_SELECT
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get total count of users
    pub async fn count_users(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Sets a user's status.
    ///
    /// # Returns
    /// The updated user, or `None` if no user has this ID
    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<Option<User>> {
        let result = sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_by_id(id).await
    }
}
