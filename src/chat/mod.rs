// ABOUTME: Chat pipeline module root
// ABOUTME: Re-exports the ContextManager and the pieces of the respond pipeline
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Chat Pipeline
//!
//! Everything between an incoming user message and the streamed reply:
//! context windowing with summarization, link augmentation, markdown
//! rendering, per-conversation locking, and the lazy reply stream, all
//! orchestrated by [`ContextManager`].

/// Deterministic tutorial-link augmentation
pub mod links;
/// Per-conversation exclusive locks
pub mod locks;
/// The respond pipeline orchestrator
pub mod manager;
/// Markdown to HTML reply formatting
pub mod render;
/// Lazy reply token stream
pub mod stream;
/// Sliding-window context construction
pub mod window;

pub use locks::{ConversationGuard, ConversationLocks};
pub use manager::ContextManager;
pub use stream::ReplyStream;
