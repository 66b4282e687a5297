//! Mailbox and message types.

use std::fmt;
use std::str::FromStr;

/// Folder tag for received messages.
pub const FOLDER_INBOX: &str = "INBOX";

/// Folder tag for messages sent through the compose workflow.
pub const FOLDER_SENT: &str = "Sent";

/// Default `imap_folder` of a new mailbox.
pub const DEFAULT_IMAP_FOLDER: &str = "INBOX";

/// Maximum subject length in characters.
pub const MAX_SUBJECT_LENGTH: usize = 255;

/// Split a comma-separated recipient list into trimmed, non-empty addresses,
/// preserving order.
///
/// ```
/// use webmail::mailbox::parse_recipients;
///
/// assert_eq!(
///     parse_recipients("bob@example.com,  carol@example.com ,,"),
///     vec!["bob@example.com", "carol@example.com"]
/// );
/// ```
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

/// Outcome of handing a stored message to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Stored, not yet accepted by the relay.
    Pending,
    /// Accepted by the relay (also the value of every non-composed message).
    Sent,
    /// The relay refused the message or could not be reached.
    Failed,
}

impl DeliveryStatus {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "sent" => Ok(DeliveryStatus::Sent),
            "failed" => Ok(DeliveryStatus::Failed),
            _ => Err(format!("unknown delivery status: {s}")),
        }
    }
}

/// A user's mailbox.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Mailbox {
    /// Mailbox ID.
    pub id: i64,
    /// Owning user ID (one mailbox per user).
    pub user_id: i64,
    /// Email address, unique across all mailboxes.
    pub address: String,
    /// Folder name tag. Informational only.
    pub imap_folder: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Mailbox listing row with the owner's username.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MailboxSummary {
    /// Mailbox ID.
    pub id: i64,
    /// Email address.
    pub address: String,
    /// Owner's username.
    pub username: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for creating a mailbox.
#[derive(Debug, Clone)]
pub struct NewMailbox {
    /// Owning user ID.
    pub user_id: i64,
    /// Email address.
    pub address: String,
    /// Folder name tag.
    pub imap_folder: String,
}

impl NewMailbox {
    /// Create a mailbox with the default folder tag.
    pub fn new(user_id: i64, address: impl Into<String>) -> Self {
        Self {
            user_id,
            address: address.into(),
            imap_folder: DEFAULT_IMAP_FOLDER.to_string(),
        }
    }
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Message {
    /// Message ID.
    pub id: i64,
    /// Owning mailbox ID.
    pub mailbox_id: i64,
    /// Sender address as given.
    pub sender: String,
    /// Raw comma-separated recipient list.
    pub recipients: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Folder tag.
    pub folder: String,
    /// Read flag.
    pub is_read: bool,
    /// Whether attachments were sent with the message.
    pub has_attachments: bool,
    /// Delivery outcome.
    pub delivery_status: DeliveryStatus,
    /// Creation timestamp.
    pub created_at: String,
}

impl Message {
    /// Recipients split into trimmed, non-empty addresses.
    pub fn recipient_list(&self) -> Vec<String> {
        parse_recipients(&self.recipients)
    }
}

/// Data for creating a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Owning mailbox ID.
    pub mailbox_id: i64,
    /// Sender address.
    pub sender: String,
    /// Raw comma-separated recipient list.
    pub recipients: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Folder tag.
    pub folder: String,
    /// Read flag.
    pub is_read: bool,
    /// Whether attachments are present.
    pub has_attachments: bool,
    /// Delivery outcome.
    pub delivery_status: DeliveryStatus,
}

impl NewMessage {
    /// Create an unread INBOX message.
    pub fn new(
        mailbox_id: i64,
        sender: impl Into<String>,
        recipients: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            mailbox_id,
            sender: sender.into(),
            recipients: recipients.into(),
            subject: subject.into(),
            body: body.into(),
            folder: FOLDER_INBOX.to_string(),
            is_read: false,
            has_attachments: false,
            delivery_status: DeliveryStatus::Sent,
        }
    }

    /// Set the folder tag.
    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Set the attachment flag.
    pub fn with_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = has_attachments;
        self
    }

    /// Set the delivery status.
    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.delivery_status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_trims_and_skips_empty() {
        assert_eq!(
            parse_recipients("bob@example.com,  carol@example.com "),
            vec!["bob@example.com", "carol@example.com"]
        );
        assert_eq!(parse_recipients(" , ,"), Vec::<String>::new());
        assert_eq!(parse_recipients(""), Vec::<String>::new());
    }

    #[test]
    fn test_parse_recipients_keeps_order_and_duplicates() {
        assert_eq!(
            parse_recipients("z@x, a@x, z@x"),
            vec!["z@x", "a@x", "z@x"]
        );
    }

    #[test]
    fn test_message_recipient_list() {
        let message = Message {
            id: 1,
            mailbox_id: 1,
            sender: "alice@webiime.ir".to_string(),
            recipients: "bob@example.com,  carol@example.com ".to_string(),
            subject: "Hi".to_string(),
            body: String::new(),
            folder: FOLDER_SENT.to_string(),
            is_read: false,
            has_attachments: false,
            delivery_status: DeliveryStatus::Sent,
            created_at: "2024-01-01 00:00:00".to_string(),
        };

        assert_eq!(
            message.recipient_list(),
            vec!["bob@example.com", "carol@example.com"]
        );
        // Stored value is untouched
        assert_eq!(message.recipients, "bob@example.com,  carol@example.com ");
    }

    #[test]
    fn test_delivery_status_round_trip() {
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::Sent,
            DeliveryStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<DeliveryStatus>().unwrap(), status);
        }
        assert!("bounced".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn test_new_message_defaults() {
        let message = NewMessage::new(1, "a@x", "b@x", "s", "b");
        assert_eq!(message.folder, FOLDER_INBOX);
        assert!(!message.is_read);
        assert!(!message.has_attachments);
        assert_eq!(message.delivery_status, DeliveryStatus::Sent);
    }

    #[test]
    fn test_new_mailbox_default_folder() {
        let mailbox = NewMailbox::new(1, "alice@webiime.ir");
        assert_eq!(mailbox.imap_folder, "INBOX");
    }
}
