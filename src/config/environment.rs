// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, env_names};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose diagnostics
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection string
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:`, or a bare file path.
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Completion engine configuration
    pub engine: EngineConfig,
    /// Chat behavior settings
    pub chat: ChatConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret; when unset a random per-process secret is
    /// generated and sessions do not survive a restart
    pub jwt_secret: Option<String>,
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
}

/// Completion engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Model requested for completions
    pub model: String,
    /// Optional bearer token for the endpoint
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Chat behavior settings
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Delay between emitted reply tokens in milliseconds; 0 disables pacing
    pub token_delay_ms: u64,
}

impl ChatConfig {
    /// Pacing delay as a [`Duration`]
    #[must_use]
    pub const fn token_delay(&self) -> Duration {
        Duration::from_millis(self.token_delay_ms)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_parse_or(env_names::HTTP_PORT, defaults::HTTP_PORT)?,
            log_level: LogLevel::from_str_or_default(
                &env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            ),
            environment: Environment::from_str_or_default(
                &env::var(env_names::ENVIRONMENT).unwrap_or_default(),
            ),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(
                    &env::var(env_names::DATABASE_URL)
                        .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned()),
                ),
            },
            auth: AuthConfig {
                jwt_secret: env::var(env_names::JWT_SECRET).ok(),
                jwt_expiry_hours: env_parse_or(
                    env_names::JWT_EXPIRY_HOURS,
                    defaults::JWT_EXPIRY_HOURS,
                )?,
            },
            engine: EngineConfig {
                base_url: env::var(env_names::OLLAMA_BASE_URL)
                    .unwrap_or_else(|_| defaults::OLLAMA_BASE_URL.to_owned()),
                model: env::var(env_names::OLLAMA_MODEL)
                    .unwrap_or_else(|_| defaults::OLLAMA_MODEL.to_owned()),
                api_key: env::var(env_names::OLLAMA_API_KEY).ok(),
                timeout_secs: env_parse_or(
                    env_names::OLLAMA_TIMEOUT_SECS,
                    defaults::OLLAMA_TIMEOUT_SECS,
                )?,
            },
            chat: ChatConfig {
                token_delay_ms: env_parse_or(env_names::TOKEN_DELAY_MS, defaults::TOKEN_DELAY_MS)?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error on impossible values (zero port, zero expiry)
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow::anyhow!("HTTP_PORT must be non-zero"));
        }
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.engine.timeout_secs == 0 {
            return Err(anyhow::anyhow!("OLLAMA_TIMEOUT_SECS must be non-zero"));
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "PCGenie Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Engine: {} (model {})\n\
             - Engine Timeout: {}s\n\
             - JWT Secret: {}\n\
             - Token Delay: {}ms",
            self.http_port,
            self.log_level,
            self.environment,
            self.database.url,
            self.engine.base_url,
            self.engine.model,
            self.engine.timeout_secs,
            if self.auth.jwt_secret.is_some() {
                "From environment"
            } else {
                "Generated per process"
            },
            self.chat.token_delay_ms,
        )
    }
}

/// Read an env var and parse it, falling back to a default when unset
fn env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name).map_or(Ok(default), |raw| {
        raw.parse()
            .with_context(|| format!("Invalid {name} value: {raw}"))
    })
}
