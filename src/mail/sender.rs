//! SMTP delivery.

use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use super::{build_message, OutgoingMail};
use crate::config::SmtpConfig;

/// Errors raised while composing or delivering a message.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The MIME message could not be assembled.
    #[error("message build error: {0}")]
    Build(String),

    /// The relay refused the message or the connection failed.
    #[error("SMTP transport error: {0}")]
    Transport(String),

    /// The relay did not answer within the configured timeout.
    #[error("SMTP timeout")]
    Timeout,

    /// The relay settings are unusable.
    #[error("SMTP configuration error: {0}")]
    Config(String),
}

/// What the relay reported for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Value of the Message-ID header.
    pub message_id: Option<String>,
    /// Envelope recipients handed to the relay.
    pub recipients: Vec<String>,
    /// Final response text from the relay.
    pub response: String,
}

/// Delivers outgoing mail.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver `mail`, returning the relay's receipt.
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, DeliveryError>;
}

/// [`MailSender`] backed by lettre's async SMTP transport.
///
/// One connection is opened per message; nothing is pooled or retried.
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    default_from: String,
    timeout: Duration,
}

impl SmtpSender {
    /// Build a sender from the relay settings.
    ///
    /// `use_ssl` selects implicit TLS, otherwise `use_tls` requires STARTTLS,
    /// otherwise the connection stays plaintext. Credentials are only sent
    /// when a user is configured.
    pub fn new(config: &SmtpConfig, default_from: impl Into<String>) -> Result<Self, DeliveryError> {
        if config.use_ssl && config.use_tls {
            return Err(DeliveryError::Config(
                "use_tls and use_ssl are mutually exclusive".to_string(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| DeliveryError::Config(format!("SMTP relay error: {e}")))?
        } else if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DeliveryError::Config(format!("SMTP relay error: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port).timeout(Some(timeout));
        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            default_from: default_from.into(),
            timeout,
        })
    }
}

#[async_trait]
impl MailSender for SmtpSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt, DeliveryError> {
        let message = build_message(mail, &self.default_from)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(|v| v.to_string());
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();

        let response = tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| DeliveryError::Timeout)?
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let response = response.message().collect::<Vec<_>>().join(" ");
        tracing::info!(
            recipients = recipients.len(),
            message_id = message_id.as_deref().unwrap_or("-"),
            "Message accepted by relay"
        );

        Ok(DeliveryReceipt {
            message_id,
            recipients,
            response,
        })
    }
}
