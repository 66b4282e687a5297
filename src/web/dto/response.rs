//! Response DTOs for the web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::User;
use crate::mail::DeliveryReceipt;
use crate::mailbox::{Mailbox, MailboxSummary, Message};

/// Session tokens returned by login, registration and refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// The logged-in user. Absent on refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    /// The mailbox created by registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<MailboxCreatedResponse>,
}

/// User information in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// `{"id": .., "address": ..}` for a newly created mailbox.
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxCreatedResponse {
    pub id: i64,
    pub address: String,
}

impl From<&Mailbox> for MailboxCreatedResponse {
    fn from(mailbox: &Mailbox) -> Self {
        Self {
            id: mailbox.id,
            address: mailbox.address.clone(),
        }
    }
}

/// One row of the mailbox listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxResponse {
    pub id: i64,
    pub address: String,
    /// Owner's username.
    pub username: String,
    pub created_at: String,
}

impl From<MailboxSummary> for MailboxResponse {
    fn from(summary: MailboxSummary) -> Self {
        Self {
            id: summary.id,
            address: summary.address,
            username: summary.username,
            created_at: summary.created_at,
        }
    }
}

/// `{"mailboxes": [...]}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxListResponse {
    pub mailboxes: Vec<MailboxResponse>,
}

/// A stored message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub subject: String,
    pub sender: String,
    /// Raw comma-separated recipient list, as entered.
    pub recipients: String,
    pub body: String,
    pub folder: String,
    pub created_at: String,
    pub is_read: bool,
    pub has_attachments: bool,
    /// `pending`, `sent` or `failed`.
    pub delivery_status: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            subject: message.subject,
            sender: message.sender,
            recipients: message.recipients,
            body: message.body,
            folder: message.folder,
            created_at: message.created_at,
            is_read: message.is_read,
            has_attachments: message.has_attachments,
            delivery_status: message.delivery_status.to_string(),
        }
    }
}

/// `{"messages": [...]}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
}

/// The caller's INBOX.
#[derive(Debug, Serialize, ToSchema)]
pub struct InboxResponse {
    /// Mailbox address.
    pub mailbox: String,
    /// INBOX messages, newest first.
    pub messages: Vec<MessageResponse>,
}

/// What the compose form needs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComposeContextResponse {
    /// Sender address used for outgoing mail.
    pub from: String,
    /// Largest accepted total attachment size, in bytes.
    pub max_attachment_size: usize,
}

/// Relay acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Addresses the relay accepted, one per envelope recipient.
    pub recipients: Vec<String>,
    /// SMTP response text.
    pub response: String,
}

impl From<DeliveryReceipt> for DeliveryResponse {
    fn from(receipt: DeliveryReceipt) -> Self {
        Self {
            message_id: receipt.message_id,
            recipients: receipt.recipients,
            response: receipt.response,
        }
    }
}

/// Result of a successful send.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComposeResponse {
    /// The stored `Sent` record.
    pub message: MessageResponse,
    pub delivery: DeliveryResponse,
}
