//! Storage seams used by the mailbox workflows.
//!
//! Workflows take a `&dyn Store` so they can run against the SQLite
//! [`Database`] or any other implementation.

use async_trait::async_trait;

use super::{Database, NewUser, User, UserRepository};
use crate::mailbox::{
    DeliveryStatus, Mailbox, MailboxRepository, MailboxSummary, Message, MessageRepository,
    NewMailbox, NewMessage,
};
use crate::{Result, WebmailError};

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. A taken username is a [`WebmailError::Conflict`].
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Get a user by ID.
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by username (case-insensitive).
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check if a username is taken (case-insensitive).
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Record a successful login.
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

/// Mailbox persistence.
#[async_trait]
pub trait MailboxStore: Send + Sync {
    /// Create a user and its mailbox atomically.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_user_with_mailbox(
        &self,
        user: &NewUser,
        address: &str,
    ) -> Result<(User, Mailbox)>;

    /// Get the mailbox owned by a user.
    async fn get_mailbox_for_user(&self, user_id: i64) -> Result<Option<Mailbox>>;

    /// Check whether an address is assigned (case-insensitive).
    async fn mailbox_address_exists(&self, address: &str) -> Result<bool>;

    /// List every mailbox with its owner.
    async fn list_mailboxes(&self) -> Result<Vec<MailboxSummary>>;
}

/// Message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a message.
    async fn create_message(&self, message: &NewMessage) -> Result<Message>;

    /// All messages of a mailbox, newest first.
    async fn list_messages(&self, mailbox_id: i64) -> Result<Vec<Message>>;

    /// Messages of one folder of a mailbox, newest first.
    async fn list_folder(&self, mailbox_id: i64, folder: &str) -> Result<Vec<Message>>;

    /// Record a delivery outcome. Unknown messages are [`WebmailError::NotFound`].
    async fn set_delivery_status(&self, message_id: i64, status: DeliveryStatus) -> Result<()>;
}

/// Everything the workflows need.
pub trait Store: UserStore + MailboxStore + MessageStore {}

impl<T: UserStore + MailboxStore + MessageStore> Store for T {}

#[async_trait]
impl UserStore for Database {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        UserRepository::new(self.pool()).create(user).await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        UserRepository::new(self.pool()).get_by_id(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserRepository::new(self.pool())
            .get_by_username(username)
            .await
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        UserRepository::new(self.pool())
            .username_exists(username)
            .await
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        UserRepository::new(self.pool()).update_last_login(id).await
    }
}

#[async_trait]
impl MailboxStore for Database {
    async fn create_user_with_mailbox(
        &self,
        user: &NewUser,
        address: &str,
    ) -> Result<(User, Mailbox)> {
        let mut tx = self.pool().begin().await?;
        let user_id = UserRepository::insert(&mut *tx, user).await?;
        let mailbox_id =
            MailboxRepository::insert(&mut *tx, &NewMailbox::new(user_id, address)).await?;
        tx.commit().await?;

        let user = UserRepository::new(self.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("user".to_string()))?;
        let mailbox = MailboxRepository::new(self.pool())
            .get_by_id(mailbox_id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("mailbox".to_string()))?;

        Ok((user, mailbox))
    }

    async fn get_mailbox_for_user(&self, user_id: i64) -> Result<Option<Mailbox>> {
        MailboxRepository::new(self.pool()).get_by_user(user_id).await
    }

    async fn mailbox_address_exists(&self, address: &str) -> Result<bool> {
        MailboxRepository::new(self.pool())
            .address_exists(address)
            .await
    }

    async fn list_mailboxes(&self) -> Result<Vec<MailboxSummary>> {
        MailboxRepository::new(self.pool()).list_all().await
    }
}

#[async_trait]
impl MessageStore for Database {
    async fn create_message(&self, message: &NewMessage) -> Result<Message> {
        MessageRepository::new(self.pool()).create(message).await
    }

    async fn list_messages(&self, mailbox_id: i64) -> Result<Vec<Message>> {
        MessageRepository::new(self.pool())
            .list_for_mailbox(mailbox_id)
            .await
    }

    async fn list_folder(&self, mailbox_id: i64, folder: &str) -> Result<Vec<Message>> {
        MessageRepository::new(self.pool())
            .list_folder(mailbox_id, folder)
            .await
    }

    async fn set_delivery_status(&self, message_id: i64, status: DeliveryStatus) -> Result<()> {
        let updated = MessageRepository::new(self.pool())
            .set_delivery_status(message_id, status)
            .await?;
        if updated {
            Ok(())
        } else {
            Err(WebmailError::NotFound("message".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_with_mailbox() {
        let db = Database::open_in_memory().await.unwrap();

        let (user, mailbox) = db
            .create_user_with_mailbox(&NewUser::new("alice", "hash"), "alice@webiime.ir")
            .await
            .unwrap();

        assert_eq!(mailbox.user_id, user.id);
        assert_eq!(mailbox.address, "alice@webiime.ir");
        assert_eq!(
            db.get_mailbox_for_user(user.id).await.unwrap(),
            Some(mailbox)
        );
    }

    #[tokio::test]
    async fn test_create_user_with_taken_address_rolls_back() {
        let db = Database::open_in_memory().await.unwrap();

        db.create_user_with_mailbox(&NewUser::new("alice", "hash"), "alice@webiime.ir")
            .await
            .unwrap();
        let result = db
            .create_user_with_mailbox(&NewUser::new("mallory", "hash"), "alice@webiime.ir")
            .await;

        match result {
            Err(WebmailError::Conflict(msg)) => assert_eq!(msg, "Mailbox already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(!db.username_exists("mallory").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_with_taken_username() {
        let db = Database::open_in_memory().await.unwrap();

        db.create_user_with_mailbox(&NewUser::new("alice", "hash"), "alice@webiime.ir")
            .await
            .unwrap();
        let result = db
            .create_user_with_mailbox(&NewUser::new("Alice", "hash"), "other@webiime.ir")
            .await;

        assert!(matches!(result, Err(WebmailError::Conflict(_))));
        assert!(!db.mailbox_address_exists("other@webiime.ir").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_delivery_status_unknown_message() {
        let db = Database::open_in_memory().await.unwrap();
        let result = db.set_delivery_status(42, DeliveryStatus::Sent).await;
        assert!(matches!(result, Err(WebmailError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_as_trait_object() {
        let db = Database::open_in_memory().await.unwrap();
        let store: &dyn Store = &db;

        let user = store
            .create_user(&NewUser::new("alice", "hash"))
            .await
            .unwrap();
        store.touch_last_login(user.id).await.unwrap();

        let user = store.get_user(user.id).await.unwrap().unwrap();
        assert!(user.last_login.is_some());
        assert!(store.list_mailboxes().await.unwrap().is_empty());
    }
}
