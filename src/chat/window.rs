// ABOUTME: Sliding-window context construction for completion calls
// ABOUTME: Splits history at the compression threshold and renders turns as labeled lines
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Context Window
//!
//! Bounds the amount of history sent with each completion call. Once a
//! conversation grows past [`limits::CONTEXT_COMPRESSION_THRESHOLD`] turns,
//! everything but the last [`limits::RECENT_TURNS_KEPT`] turns is handed to
//! the engine for summarization; the summary stands in for the old turns in
//! the final context. The window is rebuilt from scratch on every call and
//! never persisted.

use crate::constants::{limits, messages};
use crate::models::StoredMessage;

/// Outcome of the compression decision for one respond call
#[derive(Debug, Clone, Copy)]
pub struct WindowSplit<'a> {
    /// Turns to compress into a summary (empty below the threshold)
    pub old: &'a [StoredMessage],
    /// Turns sent verbatim
    pub recent: &'a [StoredMessage],
}

impl WindowSplit<'_> {
    /// Whether this call needs a summarization pass
    #[must_use]
    pub const fn needs_compression(&self) -> bool {
        !self.old.is_empty()
    }
}

/// Decide which turns to compress.
///
/// The count includes the user message appended at the start of the current
/// call. At or below the threshold nothing is compressed and every turn is
/// sent verbatim.
#[must_use]
pub fn split(messages: &[StoredMessage]) -> WindowSplit<'_> {
    let len = messages.len();
    if len > limits::CONTEXT_COMPRESSION_THRESHOLD {
        let cut = len - limits::RECENT_TURNS_KEPT;
        WindowSplit {
            old: &messages[..cut],
            recent: &messages[cut..],
        }
    } else {
        WindowSplit {
            old: &[],
            recent: messages,
        }
    }
}

/// Render turns as newline-terminated `Label: text` lines.
///
/// Labels are `User` and `PCGenie`; the engine sees the same labels the
/// summarization prompt refers to.
#[must_use]
pub fn render_turns(turns: &[StoredMessage]) -> String {
    let mut rendered = String::new();
    for turn in turns {
        rendered.push_str(turn.sender.context_label());
        rendered.push_str(": ");
        rendered.push_str(&turn.text);
        rendered.push('\n');
    }
    rendered
}

/// Compose the final context from an optional summary and the rendered
/// recent turns. The summary block carries the `[Earlier Summary]` tag so
/// the engine can tell compressed from verbatim history.
#[must_use]
pub fn compose_context(summary: Option<&str>, recent_context: &str) -> String {
    let mut context = match summary {
        Some(s) => format!("{}\n{}\n", messages::SUMMARY_TAG, s.trim()),
        None => String::new(),
    };
    context.push_str(recent_context);
    context.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use chrono::Utc;

    fn turn(sender: Sender, text: &str, sequence: i64) -> StoredMessage {
        StoredMessage {
            sequence,
            conversation_id: "c1".to_owned(),
            sender,
            text: text.to_owned(),
            created_at: Utc::now(),
        }
    }

    fn turns(count: i64) -> Vec<StoredMessage> {
        (0..count)
            .map(|i| {
                let sender = if i % 2 == 0 { Sender::User } else { Sender::Assistant };
                turn(sender, &format!("message {i}"), i)
            })
            .collect()
    }

    #[test]
    fn test_split_at_threshold_keeps_everything_verbatim() {
        let messages = turns(12);
        let split = split(&messages);
        assert!(!split.needs_compression());
        assert_eq!(split.recent.len(), 12);
    }

    #[test]
    fn test_split_above_threshold_compresses_all_but_recent_tail() {
        let messages = turns(13);
        let split = split(&messages);
        assert!(split.needs_compression());
        assert_eq!(split.old.len(), 7);
        assert_eq!(split.recent.len(), 6);
        // The tail is the last six turns in order
        assert_eq!(split.recent[0].sequence, 7);
        assert_eq!(split.recent[5].sequence, 12);
    }

    #[test]
    fn test_split_empty_history() {
        let split = split(&[]);
        assert!(!split.needs_compression());
        assert!(split.recent.is_empty());
    }

    #[test]
    fn test_render_turns_labels_both_senders() {
        let messages = vec![
            turn(Sender::User, "what gpu?", 1),
            turn(Sender::Assistant, "depends on budget", 2),
        ];
        assert_eq!(
            render_turns(&messages),
            "User: what gpu?\nPCGenie: depends on budget\n"
        );
    }

    #[test]
    fn test_compose_context_without_summary() {
        assert_eq!(compose_context(None, "User: hi\n"), "User: hi");
    }

    #[test]
    fn test_compose_context_with_summary_block() {
        let context = compose_context(Some("  they want a budget build  "), "User: hi\n");
        assert_eq!(
            context,
            "[Earlier Summary]\nthey want a budget build\nUser: hi"
        );
    }
}
