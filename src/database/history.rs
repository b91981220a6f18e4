// ABOUTME: History store contract and its SQLite implementation
// ABOUTME: Append-only conversation log plus the ownership rows used for browsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Conversation History Store
//!
//! The [`HistoryStore`] trait is the storage seam of the chat core: the
//! context manager only ever talks to this contract, so tests substitute an
//! in-memory double and the core never opens its own connections.
//!
//! The log is append-only. `append` assigns the next sequence value;
//! messages are never mutated or reordered afterwards. Ownership rows are a
//! web-layer concern (who may browse/delete a conversation) and carry no
//! message content.

use crate::errors::{AppError, AppResult};
use crate::models::{ConversationSummary, Sender, StoredMessage};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Durable append-only log of conversation turns
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one turn and return its assigned sequence value
    async fn append(&self, conversation_id: &str, sender: Sender, text: &str) -> AppResult<i64>;

    /// List all turns of a conversation in ascending insertion order
    async fn list(&self, conversation_id: &str) -> AppResult<Vec<StoredMessage>>;

    /// Remove every turn of a conversation, along with its ownership row
    async fn delete(&self, conversation_id: &str) -> AppResult<()>;

    /// List the conversations claimed by an owner, newest first
    async fn list_conversations(&self, owner: &str) -> AppResult<Vec<ConversationSummary>>;

    /// Record that `owner` opened this conversation; first claimant wins,
    /// repeat claims are no-ops
    async fn claim(&self, conversation_id: &str, owner: &str) -> AppResult<()>;

    /// Who claimed this conversation, if anyone
    async fn owner(&self, conversation_id: &str) -> AppResult<Option<String>>;
}

/// SQLite-backed [`HistoryStore`]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a store over an existing pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, conversation_id: &str, sender: Sender, text: &str) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO chat_messages (conversation_id, sender, text, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(conversation_id)
        .bind(sender.as_str())
        .bind(text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to append message: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    async fn list(&self, conversation_id: &str) -> AppResult<Vec<StoredMessage>> {
        let rows = sqlx::query(
            r"
            SELECT sequence, conversation_id, sender, text, created_at
            FROM chat_messages
            WHERE conversation_id = $1
            ORDER BY sequence ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list messages: {e}")))?;

        let messages = rows
            .into_iter()
            .map(|r| {
                let sender: String = r.get("sender");
                StoredMessage {
                    sequence: r.get("sequence"),
                    conversation_id: r.get("conversation_id"),
                    sender: Sender::from_str_or_default(&sender),
                    text: r.get("text"),
                    created_at: r.get("created_at"),
                }
            })
            .collect();

        Ok(messages)
    }

    async fn delete(&self, conversation_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM chat_messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete messages: {e}")))?;

        sqlx::query("DELETE FROM conversation_owners WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete ownership row: {e}")))?;

        Ok(())
    }

    async fn list_conversations(&self, owner: &str) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            r"
            SELECT conversation_id, created_at
            FROM conversation_owners
            WHERE owner = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        let summaries = rows
            .into_iter()
            .map(|r| ConversationSummary {
                conversation_id: r.get("conversation_id"),
                created_at: r.get("created_at"),
            })
            .collect();

        Ok(summaries)
    }

    async fn claim(&self, conversation_id: &str, owner: &str) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT OR IGNORE INTO conversation_owners (conversation_id, owner, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(conversation_id)
        .bind(owner)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to claim conversation: {e}")))?;

        Ok(())
    }

    async fn owner(&self, conversation_id: &str) -> AppResult<Option<String>> {
        let row =
            sqlx::query("SELECT owner FROM conversation_owners WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get owner: {e}")))?;

        Ok(row.map(|r| r.get("owner")))
    }
}
