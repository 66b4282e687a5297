//! Authentication module for the webmail service.
//!
//! This module provides password hashing, input validation and account
//! registration.

mod password;
mod registration;
pub mod validation;

pub use password::{
    generate_password, hash_password, validate_password, verify_password, PasswordError,
};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use validation::ValidationError;
