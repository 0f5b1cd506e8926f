//! Database repository for role management operations.
//!
//! Provides access to system roles with:
//! - Role lookup by name
//! - Complete role listing
//! - Idempotent creation of well-known roles
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::Role;

/// Repository for role database operations.
pub struct RoleRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> RoleRepository<'a> {
    /// Creates a new RoleRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieves a role by its exact name.
    ///
    /// # Arguments
    /// * `name` - Exact role name to search for
    ///
    /// # Returns
    /// `Some(Role)` if found, `None` otherwise
    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM roles WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(role)
    }

    /// Retrieves all roles in the system, ordered by ID.
    pub async fn get_all_roles(&self) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM roles ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(roles)
    }

    /// Returns the named role, creating it first if it does not exist.
    ///
    /// Safe under concurrent callers: the insert is a no-op when another
    /// request created the role in the meantime.
    pub async fn find_or_create_role(&self, name: &str, description: &str) -> Result<Role> {
        if let Some(role) = self.get_role_by_name(name).await? {
            return Ok(role);
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO roles (name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!("Created role '{}'", name);
        }

        self.get_role_by_name(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("role '{}' missing after insert", name))
    }
}
