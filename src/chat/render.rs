// ABOUTME: Markdown to HTML conversion for assistant replies
// ABOUTME: Pure formatting applied after link augmentation, before tokenization
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Reply Rendering
//!
//! The engine answers in markdown (the response prompt asks for bullet
//! points); the browser receives HTML. Conversion happens once per reply,
//! after link augmentation and before the HTML is split into tokens, so the
//! persisted assistant text matches what was streamed.

use pulldown_cmark::{html, Options, Parser};

/// Convert a markdown reply to HTML.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut rendered = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut rendered, parser);
    rendered
}
