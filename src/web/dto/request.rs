//! Request DTOs for the web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::not_empty_trimmed;

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "This field is required."))]
    pub refresh_token: String,
}

/// Account registration request.
///
/// Only presence is checked here; the account rules live in
/// [`crate::auth::validation`].
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub username: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password_confirm: String,
}

/// Mailbox provisioning request, as JSON or form data.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMailboxRequest {
    /// Username; the address becomes `{username}@{domain}`.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub username: String,
    /// Password; a random one is generated when absent.
    #[serde(default)]
    pub password: Option<String>,
}

/// Compose fields sent without attachments, as JSON or
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ComposeFields {
    /// Comma-separated destination addresses.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Compose form (`multipart/form-data`). Documentation only; the handler
/// reads the parts directly.
#[derive(Debug, ToSchema)]
pub struct ComposeForm {
    /// Comma-separated destination addresses.
    pub to: String,
    /// Subject line.
    pub subject: Option<String>,
    /// Plain-text body.
    pub body: Option<String>,
    /// Any number of file parts.
    pub attachments: Option<Vec<String>>,
}
