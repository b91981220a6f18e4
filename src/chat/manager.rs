// ABOUTME: ContextManager orchestrating the respond pipeline for each user message
// ABOUTME: Appends the user turn, builds the bounded context, calls the engine, streams the reply
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Context Manager
//!
//! One entry point, [`ContextManager::respond`]: append the user message,
//! load the conversation, compress older turns into a summary when the
//! history exceeds the threshold, ask the engine for the reply, augment and
//! format it, and hand back a lazy token stream. The store is re-read fresh
//! on every call; nothing is cached between calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::locks::ConversationLocks;
use super::stream::ReplyStream;
use super::{links, render, stream, window};
use crate::database::HistoryStore;
use crate::errors::{AppError, AppResult};
use crate::llm::{prompts, CompletionEngine};
use crate::models::Sender;

/// Produces the assistant's reply for each new user message
pub struct ContextManager {
    store: Arc<dyn HistoryStore>,
    engine: Arc<dyn CompletionEngine>,
    locks: ConversationLocks,
    token_delay: Duration,
}

impl ContextManager {
    /// Create a manager over the given store and engine.
    ///
    /// `token_delay` paces reply emission; zero disables pacing.
    #[must_use]
    pub fn new(
        store: Arc<dyn HistoryStore>,
        engine: Arc<dyn CompletionEngine>,
        token_delay: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            locks: ConversationLocks::new(),
            token_delay,
        }
    }

    /// Produce the reply stream for one user message.
    ///
    /// The user turn is durably appended before any engine call, so an
    /// engine failure loses nothing; the assistant turn is appended by the
    /// returned stream only on full drain. The conversation stays
    /// exclusively locked until the stream is drained or dropped.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty arguments (before any side effect),
    /// `HistoryUnavailable` when the store fails, `CompletionUnavailable`
    /// when either engine call fails.
    #[instrument(skip(self, user_text))]
    pub async fn respond(&self, conversation_id: &str, user_text: &str) -> AppResult<ReplyStream> {
        if conversation_id.trim().is_empty() {
            return Err(AppError::invalid_input("Conversation id must not be empty"));
        }
        if user_text.trim().is_empty() {
            return Err(AppError::invalid_input("Message text must not be empty"));
        }

        let guard = self.locks.acquire(conversation_id).await;

        self.store
            .append(conversation_id, Sender::User, user_text)
            .await?;
        let history = self.store.list(conversation_id).await?;

        let split = window::split(&history);
        let summary = if split.needs_compression() {
            debug!(
                total_turns = history.len(),
                compressed_turns = split.old.len(),
                "Compressing older history into a summary"
            );
            let old_context = window::render_turns(split.old);
            let question = prompts::summary_prompt(&old_context);
            // Context-free call; the old turns ride inside the question
            Some(self.engine.complete("", &question).await?)
        } else {
            None
        };

        let recent_context = window::render_turns(split.recent);
        let full_context = window::compose_context(summary.as_deref(), &recent_context);

        let response = self.engine.complete(&full_context, user_text).await?;
        let response = links::augment(response, user_text);
        let formatted = render::markdown_to_html(&response);

        Ok(stream::synthesize(
            Arc::clone(&self.store),
            conversation_id.to_owned(),
            &formatted,
            self.token_delay,
            guard,
        ))
    }
}
