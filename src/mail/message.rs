//! MIME assembly for outgoing mail.

use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;

use super::DeliveryError;

/// Content type used for every attachment part.
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original filename as uploaded.
    pub filename: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Create a new attachment.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

/// A message ready to be handed to a [`MailSender`](super::MailSender).
#[derive(Debug, Clone, Default)]
pub struct OutgoingMail {
    /// Sender address. Empty means the configured default sender.
    pub from: String,
    /// Individual recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Attachments, in upload order.
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    /// Create a message without attachments.
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    /// Add attachments.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Sender address, falling back to `default_from` when unset.
    pub fn sender_or<'a>(&'a self, default_from: &'a str) -> &'a str {
        let from = self.from.trim();
        if from.is_empty() {
            default_from
        } else {
            from
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress(format!("{address}: {e}")))
}

/// Build the MIME message for `mail`.
///
/// Without attachments the body is a single `text/plain; charset=utf-8`
/// part. With attachments the message is `multipart/mixed`: the body first,
/// then one `application/octet-stream` part per attachment carrying its
/// original filename.
pub fn build_message(mail: &OutgoingMail, default_from: &str) -> Result<Message, DeliveryError> {
    if mail.to.is_empty() {
        return Err(DeliveryError::InvalidAddress("no recipients".to_string()));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(mail.sender_or(default_from))?)
        .subject(mail.subject.clone())
        .message_id(None);

    for recipient in &mail.to {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let message = if mail.attachments.is_empty() {
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
    } else {
        let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(mail.body.clone()));
        for attachment in &mail.attachments {
            multipart = multipart.singlepart(
                MimeAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type.clone()),
            );
        }
        builder.multipart(multipart)
    };

    message.map_err(|e| DeliveryError::Build(e.to_string()))
}
