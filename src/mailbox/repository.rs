//! Mailbox and message repositories.

use sqlx::{Sqlite, SqliteExecutor};

use super::types::{
    DeliveryStatus, Mailbox, MailboxSummary, Message, NewMailbox, NewMessage,
};
use crate::db::{unique_violation, DbPool};
use crate::{Result, WebmailError};

const MAILBOX_COLUMNS: &str = "id, user_id, address, imap_folder, created_at";

const MESSAGE_COLUMNS: &str = "id, mailbox_id, sender, recipients, subject, body, folder, \
     is_read, has_attachments, delivery_status, created_at";

/// Repository for mailbox operations.
pub struct MailboxRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MailboxRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a mailbox for an existing user.
    #[cfg(test)]
    pub async fn create(&self, new_mailbox: &NewMailbox) -> Result<Mailbox> {
        let id = Self::insert(self.pool, new_mailbox).await?;
        self.get_by_id(id)
            .await?
            .ok_or_else(|| WebmailError::NotFound("mailbox".to_string()))
    }

    /// Insert a mailbox with any executor (pool or open transaction).
    pub(crate) async fn insert<'e, E>(executor: E, new_mailbox: &NewMailbox) -> Result<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let result =
            sqlx::query("INSERT INTO mailboxes (user_id, address, imap_folder) VALUES (?, ?, ?)")
                .bind(new_mailbox.user_id)
                .bind(&new_mailbox.address)
                .bind(&new_mailbox.imap_folder)
                .execute(executor)
                .await
                .map_err(|e| unique_violation(e, "Mailbox already exists"))?;

        Ok(result.last_insert_rowid())
    }

    /// Get a mailbox by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Mailbox>> {
        let sql = format!("SELECT {MAILBOX_COLUMNS} FROM mailboxes WHERE id = ?");
        let mailbox = sqlx::query_as::<Sqlite, Mailbox>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(mailbox)
    }

    /// Get the mailbox owned by a user.
    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<Mailbox>> {
        let sql = format!("SELECT {MAILBOX_COLUMNS} FROM mailboxes WHERE user_id = ?");
        let mailbox = sqlx::query_as::<Sqlite, Mailbox>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(mailbox)
    }

    /// Check whether an address is already assigned (case-insensitive).
    pub async fn address_exists(&self, address: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM mailboxes WHERE address = ?)")
                .bind(address)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// List every mailbox with its owner, newest first.
    pub async fn list_all(&self) -> Result<Vec<MailboxSummary>> {
        let mailboxes = sqlx::query_as::<Sqlite, MailboxSummary>(
            "SELECT m.id, m.address, u.username, m.created_at
             FROM mailboxes m
             JOIN users u ON u.id = m.user_id
             ORDER BY m.created_at DESC, m.id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(mailboxes)
    }
}

/// Repository for message operations.
pub struct MessageRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a message.
    pub async fn create(&self, new_message: &NewMessage) -> Result<Message> {
        let result = sqlx::query(
            "INSERT INTO messages (mailbox_id, sender, recipients, subject, body, folder,
                                   is_read, has_attachments, delivery_status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_message.mailbox_id)
        .bind(&new_message.sender)
        .bind(&new_message.recipients)
        .bind(&new_message.subject)
        .bind(&new_message.body)
        .bind(&new_message.folder)
        .bind(new_message.is_read)
        .bind(new_message.has_attachments)
        .bind(new_message.delivery_status)
        .execute(self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| WebmailError::NotFound("message".to_string()))
    }

    /// Get a message by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");
        let message = sqlx::query_as::<Sqlite, Message>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(message)
    }

    /// List all messages of a mailbox, newest first.
    pub async fn list_for_mailbox(&self, mailbox_id: i64) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE mailbox_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let messages = sqlx::query_as::<Sqlite, Message>(&sql)
            .bind(mailbox_id)
            .fetch_all(self.pool)
            .await?;
        Ok(messages)
    }

    /// List the messages of one folder of a mailbox, newest first.
    pub async fn list_folder(&self, mailbox_id: i64, folder: &str) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE mailbox_id = ? AND folder = ?
             ORDER BY created_at DESC, id DESC"
        );
        let messages = sqlx::query_as::<Sqlite, Message>(&sql)
            .bind(mailbox_id)
            .bind(folder)
            .fetch_all(self.pool)
            .await?;
        Ok(messages)
    }

    /// Record the delivery outcome of a message.
    ///
    /// Returns false if the message does not exist.
    pub async fn set_delivery_status(&self, id: i64, status: DeliveryStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE messages SET delivery_status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
