//! Outbound mail for the webmail service.
//!
//! This module turns a composed message into MIME and hands it to an SMTP
//! relay:
//! - [`build_message`] assembles a plain or `multipart/mixed` message
//! - [`MailSender`] is the delivery seam used by the compose workflow
//! - [`SmtpSender`] delivers through lettre's async SMTP transport

mod message;
mod sender;

pub use message::{build_message, Attachment, OutgoingMail};
pub use sender::{DeliveryError, DeliveryReceipt, MailSender, SmtpSender};
