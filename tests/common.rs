// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database setup, engine doubles, and session minting helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `pcgenie`
//!
//! Common setup functions to reduce duplication across integration tests:
//! in-memory databases, completion engine doubles, and pre-built application
//! state with pacing disabled.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use pcgenie::{
    auth::{self, AuthManager},
    chat::ContextManager,
    database::{Database, HistoryStore, SqliteHistoryStore, UserManager},
    errors::{AppError, AppResult},
    llm::CompletionEngine,
    models::{ConversationSummary, Sender, StoredMessage},
    routes::AppState,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Create a test authentication manager with a random secret
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(&auth::generate_jwt_secret(), 24)
}

/// Assemble full application state over an in-memory database with token
/// pacing disabled
pub async fn create_test_state(engine: Arc<dyn CompletionEngine>) -> Result<Arc<AppState>> {
    let database = create_test_database().await?;
    let history: Arc<dyn HistoryStore> =
        Arc::new(SqliteHistoryStore::new(database.pool().clone()));

    Ok(Arc::new(AppState {
        users: UserManager::new(database.pool().clone()),
        history: Arc::clone(&history),
        auth: create_test_auth_manager(),
        chat: ContextManager::new(history, Arc::clone(&engine), std::time::Duration::ZERO),
        engine,
    }))
}

/// Mint a session token directly, bypassing the login route
pub fn session_for(state: &AppState, subject: &str, username: &str, guest: bool) -> String {
    state
        .auth
        .create_session(subject, username, guest)
        .unwrap()
        .token
}

// ============================================================================
// Completion Engine Doubles
// ============================================================================

/// Engine double that replays queued replies and records every call
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<String>>,
    /// Recorded (context, question) pairs in call order
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedEngine {
    /// Queue replies in the order the engine should return them
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Recorded calls so far
    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionEngine for ScriptedEngine {
    async fn complete(&self, context: &str, question: &str) -> AppResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((context.to_owned(), question.to_owned()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::completion_unavailable("Scripted engine exhausted"))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Engine double that always fails, simulating an unreachable backend
pub struct FailingEngine;

#[async_trait]
impl CompletionEngine for FailingEngine {
    async fn complete(&self, _context: &str, _question: &str) -> AppResult<String> {
        Err(AppError::completion_unavailable(
            "Cannot connect to completion backend",
        ))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

// ============================================================================
// In-Memory History Store
// ============================================================================

/// `HistoryStore` double backed by plain hash maps.
///
/// Sequence values come from one shared counter so they strictly increase
/// across conversations and are never reused, matching the SQLite
/// AUTOINCREMENT behavior.
#[derive(Default)]
pub struct MemoryHistoryStore {
    next_sequence: AtomicI64,
    messages: Mutex<HashMap<String, Vec<StoredMessage>>>,
    owners: Mutex<Vec<(String, String)>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_sequence: AtomicI64::new(1),
            messages: Mutex::new(HashMap::new()),
            owners: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, conversation_id: &str, sender: Sender, text: &str) -> AppResult<i64> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        self.messages
            .lock()
            .unwrap()
            .entry(conversation_id.to_owned())
            .or_default()
            .push(StoredMessage {
                sequence,
                conversation_id: conversation_id.to_owned(),
                sender,
                text: text.to_owned(),
                created_at: Utc::now(),
            });
        Ok(sequence)
    }

    async fn list(&self, conversation_id: &str) -> AppResult<Vec<StoredMessage>> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, conversation_id: &str) -> AppResult<()> {
        self.messages.lock().unwrap().remove(conversation_id);
        self.owners
            .lock()
            .unwrap()
            .retain(|(id, _)| id != conversation_id);
        Ok(())
    }

    async fn list_conversations(&self, owner: &str) -> AppResult<Vec<ConversationSummary>> {
        Ok(self
            .owners
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(_, o)| o == owner)
            .map(|(id, _)| ConversationSummary {
                conversation_id: id.clone(),
                created_at: Utc::now(),
            })
            .collect())
    }

    async fn claim(&self, conversation_id: &str, owner: &str) -> AppResult<()> {
        let mut owners = self.owners.lock().unwrap();
        if !owners.iter().any(|(id, _)| id == conversation_id) {
            owners.push((conversation_id.to_owned(), owner.to_owned()));
        }
        Ok(())
    }

    async fn owner(&self, conversation_id: &str) -> AppResult<Option<String>> {
        Ok(self
            .owners
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == conversation_id)
            .map(|(_, o)| o.clone()))
    }
}
