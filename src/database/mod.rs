// ABOUTME: Database management for user accounts and conversation history
// ABOUTME: Owns the SQLite pool and runs inline migrations at startup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! SQLite-backed persistence for PCGenie. The [`Database`] handle owns the
//! connection pool and creates the schema on startup; the per-domain managers
//! ([`users::UserManager`], [`history::SqliteHistoryStore`]) borrow cloned
//! pools from it.

/// History store trait and its SQLite implementation
pub mod history;
/// User account storage
pub mod users;

pub use history::{HistoryStore, SqliteHistoryStore};
pub use users::UserManager;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};
use tracing::info;

/// Database manager for account and conversation storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_history().await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Create the user accounts table
    async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create the conversation history tables
    ///
    /// `chat_messages.sequence` is the append-only order key; AUTOINCREMENT
    /// guarantees values strictly increase and are never reused, even after
    /// deletes.
    async fn migrate_history(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                sequence INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL,
                sender TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_conversation \
             ON chat_messages(conversation_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversation_owners (
                conversation_id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_owners_owner \
             ON conversation_owners(owner)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
