// ABOUTME: Completion engine abstraction used by the chat pipeline
// ABOUTME: Defines the CompletionEngine trait and re-exports the Ollama-backed implementation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Completion Engine
//!
//! The chat pipeline talks to its language model through [`CompletionEngine`]:
//! one rendered context plus one question in, one complete answer out. The
//! token stream the browser sees is synthesized downstream from that answer,
//! so engines never deal in streaming.

pub mod ollama;
pub mod prompts;

pub use ollama::OllamaEngine;

use async_trait::async_trait;

use crate::errors::AppResult;

/// A text-completion backend that answers one question per call.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Produce a complete answer for `question`, grounded in the rendered
    /// conversation `context`. The context is empty for context-free calls
    /// such as history summarization.
    ///
    /// # Errors
    ///
    /// Returns an error carrying
    /// [`ErrorCode::CompletionUnavailable`](crate::errors::ErrorCode::CompletionUnavailable)
    /// when the backend is unreachable or returns an unusable response.
    async fn complete(&self, context: &str, question: &str) -> AppResult<String>;

    /// Probe backend reachability. Used by the health endpoint.
    async fn health_check(&self) -> bool;
}
