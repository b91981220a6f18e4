// ABOUTME: Lazy finite token stream carrying one assistant reply to the caller
// ABOUTME: Persists the concatenated reply only after the final token is taken
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Reply Stream
//!
//! The formatted reply is split on whitespace and re-emitted token by token,
//! each with a trailing space, optionally paced by a configured delay. The
//! assistant turn is appended to the store only once every token has been
//! taken; a stream dropped early persists nothing and releases the
//! conversation lock through its owned guard.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_util::Stream;
use tokio::time::sleep;
use tracing::{debug, error};

use super::locks::ConversationGuard;
use crate::database::HistoryStore;
use crate::errors::AppResult;
use crate::models::Sender;

/// Lazy, finite, non-restartable sequence of reply tokens.
///
/// Yields `Err` only when persisting the drained reply fails; token emission
/// itself cannot fail.
pub type ReplyStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// Build the token stream for one formatted reply.
///
/// `guard` is the conversation lock held since the start of the respond
/// call; it moves into the stream and is released on drop, whether the
/// stream was drained or abandoned.
pub fn synthesize(
    store: Arc<dyn HistoryStore>,
    conversation_id: String,
    formatted_html: &str,
    token_delay: Duration,
    guard: ConversationGuard,
) -> ReplyStream {
    let tokens: Vec<String> = formatted_html
        .split_whitespace()
        .map(str::to_owned)
        .collect();

    Box::pin(stream! {
        let _guard = guard;
        let mut reply = String::new();

        for token in tokens {
            let emitted = format!("{token} ");
            reply.push_str(&emitted);
            yield Ok(emitted);
            if !token_delay.is_zero() {
                sleep(token_delay).await;
            }
        }

        // Reached only on full drain; an abandoned stream stops above and
        // leaves no assistant turn behind.
        match store
            .append(&conversation_id, Sender::Assistant, reply.trim())
            .await
        {
            Ok(sequence) => {
                debug!(conversation_id = %conversation_id, sequence, "Persisted assistant reply");
            }
            Err(e) => {
                error!(conversation_id = %conversation_id, "Failed to persist assistant reply: {e}");
                yield Err(e);
            }
        }
    })
}
