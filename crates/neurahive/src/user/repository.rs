//! User repository for database operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewUser, User, UserListQuery};
use crate::auth::{CredentialStore, RoleSet};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, enabled, created_at, updated_at, last_login_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: NewUser) -> Result<User> {
        debug!("Creating user: {}", user.email);

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, role)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Get a user by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;

        Ok(user)
    }

    /// List users with optional filters.
    #[instrument(skip(self))]
    pub async fn list(&self, query: UserListQuery) -> Result<Vec<User>> {
        let limit = query.limit.unwrap_or(100).clamp(1, 1000);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut sql = format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1");
        if query.enabled.is_some() {
            sql.push_str(" AND enabled = ?");
        }
        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");

        let mut query_builder = sqlx::query_as::<_, User>(&sql);
        if let Some(enabled) = query.enabled {
            query_builder = query_builder.bind(enabled);
        }
        query_builder = query_builder.bind(limit).bind(offset);

        let users = query_builder
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        Ok(users)
    }

    /// Enable or disable a user.
    #[instrument(skip(self))]
    pub async fn set_enabled(&self, id: i64, enabled: bool) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET enabled = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User not found: {}", id);
        }

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    /// Replace a user's role set.
    #[instrument(skip(self))]
    pub async fn set_roles(&self, id: i64, roles: &RoleSet) -> Result<User> {
        let result =
            sqlx::query("UPDATE users SET role = ?, updated_at = datetime('now') WHERE id = ?")
                .bind(roles)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to update user roles")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User not found: {}", id);
        }

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    /// Overwrite email, name, password hash and roles.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn update(&self, id: i64, user: NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, name = ?, password_hash = ?, role = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User not found: {}", id);
        }

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    /// Update last login timestamp.
    #[instrument(skip(self))]
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update last login")?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_by_email(email).await
    }

    async fn record_login(&self, id: i64) -> Result<()> {
        self.update_last_login(id).await
    }
}
