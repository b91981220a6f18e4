// ABOUTME: Deterministic tutorial-link augmentation keyed on user phrasing
// ABOUTME: First matching trigger phrase appends a fixed markdown link suffix to the reply
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Link Augmentation
//!
//! Post-processing that never involves the model: the raw user text is
//! scanned case-insensitively against a static table of trigger phrases, and
//! the first match appends a fixed tutorial link to the reply. At most one
//! suffix per reply; table order breaks ties.

/// One augmentation rule: any phrase hit maps to the same link
struct LinkEntry {
    phrases: &'static [&'static str],
    url: &'static str,
}

/// Trigger table, scanned top to bottom. Phrases are stored lowercase;
/// matching lowercases the input.
const LINK_TABLE: &[LinkEntry] = &[LinkEntry {
    phrases: &[
        "build a pc",
        "how to build a pc",
        "assemble pc",
        "build computer",
        "guide me through the assembly process",
    ],
    url: "https://www.youtube.com/watch?v=PXaLc9AYIcg",
}];

/// Find the link configured for the first trigger phrase contained in
/// `user_text`, if any.
#[must_use]
pub fn find_link(user_text: &str) -> Option<&'static str> {
    let lowered = user_text.to_lowercase();
    LINK_TABLE.iter().find_map(|entry| {
        entry
            .phrases
            .iter()
            .any(|phrase| lowered.contains(phrase))
            .then_some(entry.url)
    })
}

/// Append the tutorial-link suffix to `response` when `user_text` contains a
/// trigger phrase; otherwise return it unchanged.
#[must_use]
pub fn augment(response: String, user_text: &str) -> String {
    match find_link(user_text) {
        Some(url) => format!("{response}\n\n[Watch this tutorial]({url})"),
        None => response,
    }
}
