//! Mailbox service: listings and provisioning.

use tracing::info;

use super::types::{Mailbox, MailboxSummary, Message, FOLDER_INBOX};
use crate::auth::{generate_password, hash_password, validation::validate_username};
use crate::db::{NewUser, Store};
use crate::{Result, WebmailError};

/// Address of the mailbox belonging to `username`.
pub fn mailbox_address(username: &str, domain: &str) -> String {
    format!("{username}@{domain}")
}

/// Read-side and provisioning operations on mailboxes.
pub struct MailboxService<'a> {
    store: &'a dyn Store,
    domain: &'a str,
}

impl<'a> MailboxService<'a> {
    /// Create a new service over `store` for the mail `domain`.
    pub fn new(store: &'a dyn Store, domain: &'a str) -> Self {
        Self { store, domain }
    }

    /// Address a mailbox for `username` would get.
    pub fn address_for(&self, username: &str) -> String {
        mailbox_address(username, self.domain)
    }

    /// The caller's mailbox.
    pub async fn mailbox_for(&self, user_id: i64) -> Result<Mailbox> {
        self.store
            .get_mailbox_for_user(user_id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("mailbox".to_string()))
    }

    /// INBOX messages of the caller's mailbox, newest first.
    pub async fn inbox(&self, user_id: i64) -> Result<(Mailbox, Vec<Message>)> {
        let mailbox = self.mailbox_for(user_id).await?;
        let messages = self.store.list_folder(mailbox.id, FOLDER_INBOX).await?;
        Ok((mailbox, messages))
    }

    /// All messages of the caller's mailbox, newest first.
    pub async fn messages(&self, user_id: i64) -> Result<Vec<Message>> {
        let mailbox = self.mailbox_for(user_id).await?;
        self.store.list_messages(mailbox.id).await
    }

    /// Every mailbox on the system with its owner.
    pub async fn list_all(&self) -> Result<Vec<MailboxSummary>> {
        self.store.list_mailboxes().await
    }

    /// Create a user named `username` together with its mailbox.
    ///
    /// Without a password a random 16-hex-character one is set. Fails with
    /// [`WebmailError::Conflict`] ("Mailbox already exists") when the address
    /// is taken; nothing is created in that case.
    pub async fn provision(&self, username: &str, password: Option<&str>) -> Result<Mailbox> {
        let username = username.trim();
        validate_username(username).map_err(|e| WebmailError::Validation(e.to_string()))?;

        let address = self.address_for(username);
        if self.store.mailbox_address_exists(&address).await? {
            return Err(WebmailError::Conflict("Mailbox already exists".to_string()));
        }

        let password = match password.filter(|p| !p.is_empty()) {
            Some(p) => p.to_string(),
            None => generate_password(),
        };
        let password_hash =
            hash_password(&password).map_err(|e| WebmailError::Validation(e.to_string()))?;

        let new_user = NewUser::new(username, password_hash).with_email(&address);
        let (user, mailbox) = self
            .store
            .create_user_with_mailbox(&new_user, &address)
            .await?;

        info!(
            username = %user.username,
            mailbox_id = mailbox.id,
            address = %mailbox.address,
            "Mailbox provisioned"
        );

        Ok(mailbox)
    }
}
