// ABOUTME: Application constants organized by domain
// ABOUTME: Context window limits, env var names, defaults, and canned assistant text
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Application constants grouped into logical domains. Anything a deployment
//! may want to override lives in [`env_names`] with its fallback in
//! [`defaults`]; hard limits that define behavior live in [`limits`].

/// Display name used for assistant turns in the context window and UI
pub const ASSISTANT_DISPLAY_NAME: &str = "PCGenie";

/// Context window limits
pub mod limits {
    /// Message count above which older turns are compressed into a summary
    pub const CONTEXT_COMPRESSION_THRESHOLD: usize = 12;

    /// Number of most recent turns always sent verbatim
    pub const RECENT_TURNS_KEPT: usize = 6;

    /// Minimum username length accepted at registration
    pub const MIN_USERNAME_LENGTH: usize = 3;

    /// Minimum password length accepted at registration and reset
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Hex chars of randomness in a guest identifier (`guest_xxxxxxxx`)
    pub const GUEST_ID_SUFFIX_LENGTH: usize = 8;
}

/// Environment variable names
pub mod env_names {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Secret used to sign session tokens
    pub const JWT_SECRET: &str = "PCGENIE_JWT_SECRET";
    /// Session token lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Base URL of the OpenAI-compatible completion endpoint
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
    /// Model name requested from the completion endpoint
    pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
    /// Optional API key for the completion endpoint
    pub const OLLAMA_API_KEY: &str = "OLLAMA_API_KEY";
    /// Completion request timeout in seconds
    pub const OLLAMA_TIMEOUT_SECS: &str = "OLLAMA_TIMEOUT_SECS";
    /// Delay between emitted reply tokens in milliseconds (0 disables pacing)
    pub const TOKEN_DELAY_MS: &str = "TOKEN_DELAY_MS";
    /// Deployment environment (development | production)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Log output format (json | pretty | compact)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Default values applied when the environment leaves a knob unset
pub mod defaults {
    /// Default HTTP listen port
    pub const HTTP_PORT: u16 = 8080;
    /// Default SQLite database location
    pub const DATABASE_URL: &str = "sqlite:./data/pcgenie.db";
    /// Default session token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Default OpenAI-compatible endpoint (local Ollama)
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
    /// Default completion model
    pub const OLLAMA_MODEL: &str = "llama3";
    /// Default completion request timeout
    pub const OLLAMA_TIMEOUT_SECS: u64 = 120;
    /// Default inter-token pacing delay
    pub const TOKEN_DELAY_MS: u64 = 50;
}

/// Cryptographic constants
pub mod crypto {
    /// JWT signing algorithm
    pub const JWT_ALGORITHM: &str = "HS256";
    /// Byte length of a generated fallback JWT secret
    pub const GENERATED_SECRET_LENGTH: usize = 64;
}

/// Canned assistant text
pub mod messages {
    /// Tag prefixed to the compressed-history block of a context window,
    /// letting the engine distinguish summary from verbatim turns
    pub const SUMMARY_TAG: &str = "[Earlier Summary]";

    /// First assistant turn seeded into every fresh non-guest conversation
    pub const WELCOME_MESSAGE: &str = "\u{1f44b} Hello there! Welcome to PCGenie, your smart assistant for building the perfect PC.<br>I can help you:<ul><li>\u{26a1} Compare components</li><li>\u{1f527} Suggest builds based on your needs</li><li>\u{1f6e0}\u{fe0f} Guide you through the assembly process</li></ul>What are you looking to do today? \u{1f914}";
}
