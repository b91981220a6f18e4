// ABOUTME: Main library entry point for the PCGenie chat assistant
// ABOUTME: Provides the context-managed chat core, REST/SSE API, and SQLite persistence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

// Crate-level attributes:
// - recursion_limit: Increased from default 128 to 256 for complex derive macros
//   (serde, thiserror) on deeply nested types like API responses
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # PCGenie
//!
//! A web chat assistant for PC-component advice, backed by an
//! OpenAI-compatible completion endpoint (Ollama by default).
//!
//! ## Features
//!
//! - **Context compression**: long conversations are summarized so prompts
//!   stay bounded while memory of earlier turns is retained
//! - **Streaming replies**: assistant output is paced token-by-token over SSE
//! - **Accounts and guests**: JWT sessions for registered users, throwaway
//!   sessions for anonymous visitors
//! - **Durable history**: append-only conversation log in SQLite
//!
//! ## Architecture
//!
//! - **chat**: context windowing, summarization, link augmentation, and the
//!   reply stream
//! - **llm**: the [`llm::CompletionEngine`] seam and its Ollama-backed
//!   implementation
//! - **database**: user accounts and the [`database::HistoryStore`] log
//! - **routes**: axum handlers for auth, conversations, and SSE messaging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pcgenie::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("PCGenie configured for HTTP port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Conversation context assembly and reply streaming
pub mod chat;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// SQLite persistence for accounts and conversation history
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Completion engine abstraction and the Ollama client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Core data structures shared across layers
pub mod models;

/// HTTP routes and shared application state
pub mod routes;
