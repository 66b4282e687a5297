//! Input validation for account registration and mailbox provisioning.

use thiserror::Error;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 4;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is too short.
    #[error("username must be at least {MIN_USERNAME_LENGTH} characters")]
    UsernameTooShort,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains invalid characters.
    #[error("username can only contain letters, digits, '_', '.' and '-'")]
    UsernameInvalidChars,

    /// Username starts or ends with a dot, or has two in a row.
    #[error("username cannot start or end with '.' or contain '..'")]
    UsernameInvalidDots,

    /// Username is reserved.
    #[error("this username is reserved")]
    UsernameReserved,

    /// Password and confirmation differ.
    #[error("the two password fields didn't match")]
    PasswordMismatch,

    /// Password is the same as username.
    #[error("password cannot be the same as username")]
    PasswordSameAsUsername,

    /// Email is missing.
    #[error("email is required")]
    EmailRequired,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,
}

impl ValidationError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UsernameTooShort
            | ValidationError::UsernameTooLong
            | ValidationError::UsernameInvalidChars
            | ValidationError::UsernameInvalidDots
            | ValidationError::UsernameReserved => "username",
            ValidationError::PasswordMismatch => "password_confirm",
            ValidationError::PasswordSameAsUsername => "password",
            ValidationError::EmailRequired
            | ValidationError::EmailTooLong
            | ValidationError::EmailInvalidFormat => "email",
        }
    }
}

/// Local parts that would collide with role addresses on the mail domain.
const RESERVED_USERNAMES: &[&str] = &[
    "admin",
    "administrator",
    "postmaster",
    "hostmaster",
    "webmaster",
    "abuse",
    "root",
    "mailer-daemon",
    "noreply",
    "no-reply",
    "support",
    "security",
];

/// Check if a username is reserved.
pub fn is_reserved_username(username: &str) -> bool {
    let lower = username.to_lowercase();
    RESERVED_USERNAMES.iter().any(|&r| r == lower)
}

/// Validate a username.
///
/// Requirements:
/// - Length: 4-30 characters
/// - Characters: ASCII letters, digits, `_`, `.` and `-`
/// - No leading, trailing or doubled `.` (the name is the local part of an
///   address)
/// - Not a reserved role name
///
/// # Examples
///
/// ```
/// use webmail::auth::validation::validate_username;
///
/// assert!(validate_username("alice.w").is_ok());
/// assert!(validate_username("bob").is_err()); // too short
/// assert!(validate_username(".alice.").is_err()); // not a valid local part
/// assert!(validate_username("postmaster").is_err()); // reserved
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::UsernameInvalidChars);
    }

    if username.starts_with('.') || username.ends_with('.') || username.contains("..") {
        return Err(ValidationError::UsernameInvalidDots);
    }

    if is_reserved_username(username) {
        return Err(ValidationError::UsernameReserved);
    }

    Ok(())
}

/// Validate an email address.
///
/// Performs a basic shape check only: one `@`, a non-empty local part, a
/// dotted domain, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::EmailInvalidFormat)?;

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(|p| p.is_empty()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate the registration form fields that need cross-field checks.
///
/// Returns the first validation error encountered. Password length is
/// checked when the password is hashed.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    password_confirm: &str,
) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_email(email)?;
    if password != password_confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.eq_ignore_ascii_case(username) {
        return Err(ValidationError::PasswordSameAsUsername);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("john_doe").is_ok());
        assert!(validate_username("j.doe-99").is_ok());
        assert!(validate_username(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn test_validate_username_length() {
        assert_eq!(
            validate_username("abc"),
            Err(ValidationError::UsernameTooShort)
        );
        assert_eq!(
            validate_username(""),
            Err(ValidationError::UsernameTooShort)
        );
        assert_eq!(
            validate_username(&"a".repeat(31)),
            Err(ValidationError::UsernameTooLong)
        );
    }

    #[test]
    fn test_validate_username_invalid_chars() {
        for name in ["alice@x", "ali ce", "alice,bob", "ālice"] {
            assert_eq!(
                validate_username(name),
                Err(ValidationError::UsernameInvalidChars),
                "{name}"
            );
        }
    }

    #[test]
    fn test_validate_username_dots() {
        for name in [".alice", "alice.", ".alice.", "a..b", "al...ice"] {
            assert_eq!(
                validate_username(name),
                Err(ValidationError::UsernameInvalidDots),
                "{name}"
            );
        }
        assert!(validate_username("a.b.c.d").is_ok());
    }

    #[test]
    fn test_accepted_usernames_make_valid_addresses() {
        for name in ["alice", "j.doe-99", "_under_", "-dash-", "a.b.c.d", "Mixed.Case"] {
            assert!(validate_username(name).is_ok(), "{name}");
            let address = format!("{name}@webiime.ir");
            assert!(
                address.parse::<lettre::Address>().is_ok(),
                "{address} should parse"
            );
        }
    }

    #[test]
    fn test_validate_username_reserved() {
        assert_eq!(
            validate_username("Postmaster"),
            Err(ValidationError::UsernameReserved)
        );
        assert_eq!(
            validate_username("mailer-daemon"),
            Err(ValidationError::UsernameReserved)
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());

        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        for bad in ["invalid", "@example.com", "user@", "user@localhost", "a@b@c.d", "a b@c.d", "a@b..c"] {
            assert_eq!(
                validate_email(bad),
                Err(ValidationError::EmailInvalidFormat),
                "{bad}"
            );
        }
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("alice", "a@example.com", "s3cretpass", "s3cretpass").is_ok());
        assert_eq!(
            validate_registration("alice", "a@example.com", "s3cretpass", "other"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("alicealice", "a@example.com", "AliceAlice", "AliceAlice"),
            Err(ValidationError::PasswordSameAsUsername)
        );
    }

    #[test]
    fn test_error_fields() {
        assert_eq!(ValidationError::UsernameReserved.field(), "username");
        assert_eq!(ValidationError::UsernameInvalidDots.field(), "username");
        assert_eq!(ValidationError::PasswordMismatch.field(), "password_confirm");
        assert_eq!(ValidationError::EmailInvalidFormat.field(), "email");
    }
}
