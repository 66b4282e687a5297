//! User model for the webmail service.

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique, case-insensitive).
    pub username: String,
    /// Contact email address (optional).
    pub email: Option<String>,
    /// Password hash (Argon2).
    pub password: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp (optional).
    pub last_login: Option<String>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Contact email address (optional).
    pub email: Option<String>,
}

impl NewUser {
    /// Create a new user with minimal required fields.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
        }
    }

    /// Set the email address. Blank values are stored as NULL.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.email = if email.trim().is_empty() {
            None
        } else {
            Some(email.trim().to_string())
        };
        self
    }
}
