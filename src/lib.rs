//! webmail - accounts, per-user mailboxes and SMTP sending behind a JSON API.
//!
//! Every registered user owns one mailbox, `{username}@{domain}`. Messages
//! composed through the API are stored in the mailbox's `Sent` folder and
//! handed to an SMTP relay.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod mailbox;
pub mod web;

pub use auth::{
    hash_password, register, verify_password, PasswordError, RegistrationError,
    RegistrationRequest, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, Store, User};
pub use error::{Result, WebmailError};
pub use mail::{DeliveryError, MailSender, OutgoingMail, SmtpSender};
pub use mailbox::{ComposeRequest, ComposeService, Mailbox, MailboxService, Message};
