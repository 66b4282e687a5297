//! Compose workflow: store a sent message, then hand it to the relay.

use lettre::message::Mailbox as MailboxAddress;
use tracing::{error, info, warn};

use super::types::{
    parse_recipients, DeliveryStatus, Message, NewMessage, FOLDER_SENT, MAX_SUBJECT_LENGTH,
};
use crate::db::Store;
use crate::mail::{Attachment, DeliveryReceipt, MailSender, OutgoingMail};
use crate::{Result, WebmailError};

/// A message composed by a logged-in user.
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    /// Comma-separated destination addresses, stored verbatim.
    pub to: String,
    /// Subject line (may be empty).
    pub subject: String,
    /// Plain-text body (may be empty).
    pub body: String,
    /// Uploaded attachments.
    pub attachments: Vec<Attachment>,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct ComposeOutcome {
    /// The stored `Sent` record, marked `sent`.
    pub message: Message,
    /// What the relay reported.
    pub receipt: DeliveryReceipt,
}

/// Runs the compose workflow against a store and a sender.
pub struct ComposeService<'a> {
    store: &'a dyn Store,
    sender: &'a dyn MailSender,
}

impl<'a> ComposeService<'a> {
    /// Create a new compose service.
    pub fn new(store: &'a dyn Store, sender: &'a dyn MailSender) -> Self {
        Self { store, sender }
    }

    /// Send a message on behalf of `user_id`.
    ///
    /// The `Sent` record is persisted as `pending` before the relay is
    /// contacted. A relay failure leaves the record in place marked `failed`
    /// and returns [`WebmailError::Delivery`]. Once the relay has accepted the
    /// message the send succeeds even if the status update fails.
    pub async fn send(&self, user_id: i64, request: ComposeRequest) -> Result<ComposeOutcome> {
        let mailbox = self
            .store
            .get_mailbox_for_user(user_id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("mailbox".to_string()))?;

        let recipients = validate_recipients(&request.to)?;
        if request.subject.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(WebmailError::Validation(format!(
                "subject must be at most {MAX_SUBJECT_LENGTH} characters"
            )));
        }

        let message = self
            .store
            .create_message(
                &NewMessage::new(
                    mailbox.id,
                    &mailbox.address,
                    &request.to,
                    &request.subject,
                    &request.body,
                )
                .in_folder(FOLDER_SENT)
                .with_attachments(!request.attachments.is_empty())
                .with_status(DeliveryStatus::Pending),
            )
            .await?;

        let mail = OutgoingMail::new(
            &mailbox.address,
            recipients,
            request.subject,
            request.body,
        )
        .with_attachments(request.attachments);

        match self.sender.send(&mail).await {
            Ok(receipt) => {
                // The relay has the message; a failed update only leaves the row pending
                if let Err(e) = self
                    .store
                    .set_delivery_status(message.id, DeliveryStatus::Sent)
                    .await
                {
                    error!(message_id = message.id, error = %e, "Failed to mark message as sent");
                }
                info!(
                    message_id = message.id,
                    from = %mailbox.address,
                    recipients = receipt.recipients.len(),
                    "Message sent"
                );
                Ok(ComposeOutcome {
                    message: Message {
                        delivery_status: DeliveryStatus::Sent,
                        ..message
                    },
                    receipt,
                })
            }
            Err(e) => {
                warn!(message_id = message.id, error = %e, "Delivery failed");
                if let Err(mark_err) = self
                    .store
                    .set_delivery_status(message.id, DeliveryStatus::Failed)
                    .await
                {
                    error!(message_id = message.id, error = %mark_err, "Failed to mark message as failed");
                }
                Err(WebmailError::Delivery(e))
            }
        }
    }
}

/// Split and check the destination list.
///
/// Every entry must parse as a mailbox address and at least one must exist.
pub fn validate_recipients(raw: &str) -> Result<Vec<String>> {
    let recipients = parse_recipients(raw);
    if recipients.is_empty() {
        return Err(WebmailError::Validation(
            "at least one recipient is required".to_string(),
        ));
    }

    if let Some(bad) = recipients
        .iter()
        .find(|r| r.parse::<MailboxAddress>().is_err())
    {
        return Err(WebmailError::Validation(format!(
            "invalid recipient address: {bad}"
        )));
    }

    Ok(recipients)
}
