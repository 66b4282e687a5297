//! Error types for the webmail service.

use thiserror::Error;

use crate::mail::DeliveryError;

/// Common error type for the webmail service.
#[derive(Error, Debug)]
pub enum WebmailError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Unique resource already exists (username, mailbox address).
    #[error("{0}")]
    Conflict(String),

    /// The message could not be handed to the SMTP relay.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for WebmailError {
    fn from(e: sqlx::Error) -> Self {
        WebmailError::Database(e.to_string())
    }
}

/// Result type alias for webmail operations.
pub type Result<T> = std::result::Result<T, WebmailError>;
