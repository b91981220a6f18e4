// ABOUTME: Core data structures shared across storage, chat logic, and routes
// ABOUTME: Defines User accounts, message senders, and stored conversation turns
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Data Models
//!
//! Shared data structures for PCGenie: user accounts, conversation turns,
//! and the browsing summaries the web layer serves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Who produced a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human participant
    User,
    /// The PCGenie assistant
    Assistant,
}

impl Sender {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse the stored database form
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "assistant" => Self::Assistant,
            _ => Self::User,
        }
    }

    /// Label used when a turn is rendered into the context window
    #[must_use]
    pub const fn context_label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => crate::constants::ASSISTANT_DISPLAY_NAME,
        }
    }
}

impl Display for Sender {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted turn of a conversation
///
/// Messages are append-only: once stored, neither text nor ordering ever
/// changes. `sequence` is assigned by the store and strictly increases
/// across all turns it has ever accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Order key assigned at insertion, immutable afterwards
    pub sequence: i64,
    /// Conversation this turn belongs to
    pub conversation_id: String,
    /// Who produced the turn
    pub sender: Sender,
    /// Raw content (user input verbatim; assistant output after formatting)
    pub text: String,
    /// When the turn was stored
    pub created_at: DateTime<Utc>,
}

/// A registered user account
///
/// Guests never get a `User` row; a guest is purely a short-lived token
/// whose subject starts with `guest_`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Login name, unique across accounts
    pub username: String,
    /// Bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly minted id
    #[must_use]
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Conversation entry returned by history browsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Opaque conversation identifier
    pub conversation_id: String,
    /// When the conversation was first claimed
    pub created_at: DateTime<Utc>,
}
