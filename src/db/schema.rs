//! Database schema and migrations for the webmail service.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users and login sessions
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email       TEXT,
    password    TEXT NOT NULL,           -- Argon2 hash
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    last_login  TEXT
);

CREATE TABLE refresh_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    revoked_at  TEXT
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
"#,
    // v2: One mailbox per user
    r#"
CREATE TABLE mailboxes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    address      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    imap_folder  TEXT NOT NULL DEFAULT 'INBOX',  -- informational only
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v3: Messages stored per mailbox
    r#"
CREATE TABLE messages (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    mailbox_id       INTEGER NOT NULL REFERENCES mailboxes(id) ON DELETE CASCADE,
    sender           TEXT NOT NULL,
    recipients       TEXT NOT NULL,       -- raw comma-separated list
    subject          TEXT NOT NULL DEFAULT '',
    body             TEXT NOT NULL DEFAULT '',
    folder           TEXT NOT NULL DEFAULT 'INBOX',
    is_read          INTEGER NOT NULL DEFAULT 0,
    has_attachments  INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_messages_mailbox_folder ON messages(mailbox_id, folder);
CREATE INDEX idx_messages_created_at ON messages(created_at);
"#,
    // v4: Delivery outcome for sent messages
    r#"
ALTER TABLE messages ADD COLUMN delivery_status TEXT NOT NULL DEFAULT 'sent';
"#,
];
