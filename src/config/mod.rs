// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Handles environment-driven configuration for all components
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration module for PCGenie
//!
//! Centralized configuration management, loaded once at startup from
//! environment variables:
//!
//! - **Environment**: deployment environment, ports, database location
//! - **Auth**: JWT secret and session lifetime
//! - **Engine**: completion endpoint, model, and timeouts
//! - **Chat**: reply streaming behavior

/// Environment and server configuration
pub mod environment;

// Re-export main configuration types from environment
pub use environment::{
    AuthConfig, ChatConfig, DatabaseConfig, DatabaseUrl, EngineConfig, Environment, LogLevel,
    ServerConfig,
};
