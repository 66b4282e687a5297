//! API handlers.

pub mod accounts;
pub mod api;
pub mod mailbox;

pub use accounts::*;
pub use api::*;
pub use mailbox::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, NewRefreshToken, RefreshTokenRepository, User};
use crate::mail::MailSender;
use crate::web::dto::{TokenResponse, UserInfo};
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database (a cloneable pool handle).
    pub db: Database,
    /// Outgoing mail transport.
    pub sender: Arc<dyn MailSender>,
    /// Mail domain for new mailbox addresses.
    pub domain: String,
    /// Total attachment limit per message, in bytes.
    pub max_attachment_size: usize,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Refresh token expiry in days.
    pub refresh_token_expiry: u64,
}

impl AppState {
    /// Create the application state from configuration.
    pub fn new(db: Database, sender: Arc<dyn MailSender>, config: &Config) -> Self {
        Self {
            db,
            sender,
            domain: config.mail.domain.clone(),
            max_attachment_size: config.mail.max_attachment_bytes(),
            encoding_key: EncodingKey::from_secret(config.security.secret_key.as_bytes()),
            access_token_expiry: config.security.access_token_expiry_secs,
            refresh_token_expiry: config.security.refresh_token_expiry_days,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Start a session: a fresh access token plus a stored refresh token.
    pub async fn issue_tokens(&self, user: &User) -> Result<TokenResponse, ApiError> {
        let access_token = self.generate_access_token(user.id, &user.username)?;

        let refresh = RefreshTokenRepository::new(self.db.pool())
            .create(&NewRefreshToken::issue(user.id, self.refresh_token_expiry))
            .await
            .map_err(|e| {
                tracing::error!("Failed to store refresh token: {}", e);
                ApiError::internal("Failed to create session")
            })?;

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user: Some(UserInfo::from(user)),
            mailbox: None,
        })
    }
}
