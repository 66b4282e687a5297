//! Mailbox module.
//!
//! This module provides the per-user mailbox and its messages:
//! - Mailbox and message types and repositories
//! - Inbox and message listings
//! - Mailbox provisioning
//! - The compose workflow (store, then deliver)

mod compose;
mod repository;
mod service;
mod types;

pub use compose::{validate_recipients, ComposeOutcome, ComposeRequest, ComposeService};
pub use repository::{MailboxRepository, MessageRepository};
pub use service::{mailbox_address, MailboxService};
pub use types::{
    parse_recipients, DeliveryStatus, Mailbox, MailboxSummary, Message, NewMailbox, NewMessage,
    DEFAULT_IMAP_FOLDER, FOLDER_INBOX, FOLDER_SENT, MAX_SUBJECT_LENGTH,
};
