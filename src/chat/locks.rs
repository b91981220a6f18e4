// ABOUTME: Per-conversation exclusive locks serializing the respond pipeline
// ABOUTME: Owned guards travel into the reply stream so drop releases the conversation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Conversation Locks
//!
//! One async mutex per `conversation_id` serializes the read-history,
//! call-engine, append-reply sequence; different conversations proceed in
//! parallel. Guards are owned so they can move into the reply stream and
//! release on drop, whether the stream is drained or abandoned.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard holding one conversation exclusively until dropped
pub type ConversationGuard = OwnedMutexGuard<()>;

/// Lock map keyed by conversation id.
///
/// Entries are created on first use and kept for the life of the process;
/// one mutex per conversation ever touched is small enough not to need
/// eviction.
#[derive(Debug, Default, Clone)]
pub struct ConversationLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    /// Create an empty lock map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for `conversation_id`, waiting for any
    /// in-flight respond call on the same conversation to finish.
    pub async fn acquire(&self, conversation_id: &str) -> ConversationGuard {
        let lock = Arc::clone(
            self.locks
                .entry(conversation_id.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        lock.lock_owned().await
    }
}
