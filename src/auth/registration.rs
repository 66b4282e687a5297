//! Account registration.
//!
//! A registered account always comes with exactly one mailbox,
//! `{username}@{domain}`.

use thiserror::Error;
use tracing::info;

use crate::auth::validation::{validate_registration, ValidationError};
use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, Store, User};
use crate::mailbox::{mailbox_address, Mailbox};
use crate::WebmailError;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Username already exists.
    #[error("username already exists")]
    UsernameExists,

    /// The derived mailbox address is already assigned.
    #[error("mailbox already exists")]
    MailboxExists,

    /// Password policy or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<WebmailError> for RegistrationError {
    fn from(err: WebmailError) -> Self {
        RegistrationError::Database(err.to_string())
    }
}

/// Registration form data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username (4-30 characters).
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Password (8-128 characters).
    pub password: String,
    /// Password confirmation.
    pub password_confirm: String,
}

impl RegistrationRequest {
    /// Create a registration request where the confirmation equals the password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password_confirm: password.clone(),
            password,
        }
    }

    /// Set a different confirmation.
    pub fn with_confirmation(mut self, password_confirm: impl Into<String>) -> Self {
        self.password_confirm = password_confirm.into();
        self
    }
}

/// Register a new account with its mailbox.
///
/// This function:
/// 1. Validates all input fields
/// 2. Checks the username and the derived address are free
/// 3. Hashes the password
/// 4. Creates the user and mailbox in one transaction
pub async fn register(
    store: &dyn Store,
    domain: &str,
    request: RegistrationRequest,
) -> std::result::Result<(User, Mailbox), RegistrationError> {
    validate_registration(
        &request.username,
        &request.email,
        &request.password,
        &request.password_confirm,
    )?;

    if store.username_exists(&request.username).await? {
        return Err(RegistrationError::UsernameExists);
    }

    let address = mailbox_address(&request.username, domain);
    if store.mailbox_address_exists(&address).await? {
        return Err(RegistrationError::MailboxExists);
    }

    let password_hash = hash_password(&request.password)?;
    let new_user = NewUser::new(&request.username, password_hash).with_email(&request.email);

    // A concurrent registration can still win between the checks and the insert
    let (user, mailbox) = match store.create_user_with_mailbox(&new_user, &address).await {
        Ok(created) => created,
        Err(WebmailError::Conflict(msg)) if msg.starts_with("Mailbox") => {
            return Err(RegistrationError::MailboxExists)
        }
        Err(WebmailError::Conflict(_)) => return Err(RegistrationError::UsernameExists),
        Err(e) => return Err(e.into()),
    };

    info!(
        username = %user.username,
        user_id = user.id,
        address = %mailbox.address,
        "New user registered"
    );

    Ok((user, mailbox))
}
