//! User repository for the webmail service.
//!
//! This module provides CRUD operations for users in the database.

use sqlx::{Sqlite, SqliteExecutor};

use super::user::{NewUser, User};
use super::DbPool;
use crate::{Result, WebmailError};

const USER_COLUMNS: &str = "id, username, email, password, is_active, created_at, last_login";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = Self::insert(self.pool, new_user).await?;
        self.get_by_id(id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("user".to_string()))
    }

    /// Insert a user with any executor (pool or open transaction).
    ///
    /// Returns the new user ID. A duplicate username is reported as
    /// [`WebmailError::Conflict`].
    pub(crate) async fn insert<'e, E>(executor: E, new_user: &NewUser) -> Result<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("INSERT INTO users (username, password, email) VALUES (?, ?, ?)")
            .bind(&new_user.username)
            .bind(&new_user.password)
            .bind(&new_user.email)
            .execute(executor)
            .await
            .map_err(|e| unique_violation(e, "Username already exists"))?;

        Ok(result.last_insert_rowid())
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query_as::<Sqlite, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(result)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE");
        let result = sqlx::query_as::<Sqlite, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(result)
    }

    /// Check if a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? COLLATE NOCASE)",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Record a successful login.
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Activate or deactivate an account.
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map a UNIQUE constraint failure to a conflict, anything else to a database error.
pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> WebmailError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            WebmailError::Conflict(message.to_string())
        }
        _ => WebmailError::Database(err.to_string()),
    }
}
