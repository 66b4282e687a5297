//! Refresh tokens backing login sessions.

use chrono::{Duration, Utc};

use super::DbPool;
use crate::{Result, WebmailError};

/// Timestamp layout shared with SQLite's `datetime('now')`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TOKEN_COLUMNS: &str = "id, user_id, token, expires_at, created_at, revoked_at";

/// Refresh token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// Token ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque token string.
    pub token: String,
    /// Expiration timestamp (UTC).
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Revocation timestamp (None if not revoked).
    pub revoked_at: Option<String>,
}

/// New refresh token for creation.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    /// Owning user ID.
    pub user_id: i64,
    /// Opaque token string.
    pub token: String,
    /// Expiration timestamp (UTC, `YYYY-MM-DD HH:MM:SS`).
    pub expires_at: String,
}

impl NewRefreshToken {
    /// Issue a fresh random token valid for `expiry_days`.
    pub fn issue(user_id: i64, expiry_days: u64) -> Self {
        let expires_at = Utc::now() + Duration::days(expiry_days as i64);
        Self {
            user_id,
            token: uuid::Uuid::new_v4().to_string(),
            expires_at: expires_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Repository for refresh token operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a refresh token.
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(&new_token.expires_at)
        .fetch_one(self.pool)
        .await?;

        let sql = format!("SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE id = ?");
        sqlx::query_as::<_, RefreshToken>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| WebmailError::NotFound("refresh token".to_string()))
    }

    /// Get a token that is neither expired nor revoked.
    pub async fn get_valid_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens
             WHERE token = ? AND revoked_at IS NULL AND expires_at > datetime('now')"
        );
        let result = sqlx::query_as::<_, RefreshToken>(&sql)
            .bind(token)
            .fetch_optional(self.pool)
            .await?;

        Ok(result)
    }

    /// Revoke a single token. Returns false if it was already revoked or unknown.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = datetime('now')
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live token of a user (logout).
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = datetime('now')
             WHERE user_id = ? AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired and revoked tokens.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens
             WHERE expires_at < datetime('now') OR revoked_at IS NOT NULL",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
