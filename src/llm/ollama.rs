// ABOUTME: OpenAI-compatible chat completions client for local Ollama-style backends
// ABOUTME: Maps transport and API failures onto CompletionUnavailable for the chat pipeline
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Ollama Completion Engine
//!
//! Speaks the OpenAI-compatible `/chat/completions` dialect served by Ollama
//! (and vLLM, LocalAI, LM Studio) at `http://localhost:11434/v1` by default.
//! Each call renders the PCGenie response prompt and performs one
//! non-streaming request; every failure mode surfaces as
//! `CompletionUnavailable` so callers need no transport knowledge.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{prompts, CompletionEngine};
use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};

/// Connection timeout for the HTTP client (separate from the per-request
/// timeout, which covers slow generation on large models)
const CONNECT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// OpenAI-compatible wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Engine
// ============================================================================

/// Completion engine backed by an OpenAI-compatible local server.
#[derive(Debug, Clone)]
pub struct OllamaEngine {
    client: Client,
    config: EngineConfig,
}

impl OllamaEngine {
    /// Create an engine from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: EngineConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized completion engine"
        );

        Ok(Self { client, config })
    }

    /// Build the full URL for an API endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    /// Add authorization header if an API key is configured (stock Ollama
    /// ignores it; gateways in front of it may not)
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// Map a non-success HTTP response onto `CompletionUnavailable`
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(parsed) => {
                let error_type = parsed.error.error_type.unwrap_or_else(|| "unknown".to_owned());
                AppError::completion_unavailable(format!(
                    "Backend rejected the request ({status}): {error_type} - {}",
                    parsed.error.message
                ))
            }
            // Non-JSON error bodies are common with local servers
            Err(_) => match status.as_u16() {
                502..=504 => AppError::completion_unavailable(
                    "Completion backend is not responding. Is Ollama running?",
                ),
                _ => AppError::completion_unavailable(format!(
                    "Backend error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                )),
            },
        }
    }
}

#[async_trait]
impl CompletionEngine for OllamaEngine {
    #[instrument(skip(self, context, question), fields(model = %self.config.model))]
    async fn complete(&self, context: &str, question: &str) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatCompletionMessage {
                role: "user".to_owned(),
                content: prompts::response_prompt(context, question),
            }],
            stream: Some(false),
        };

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&request);

        let response = self.add_auth_header(http_request).send().await.map_err(|e| {
            error!("Failed to send completion request: {e}");
            if e.is_connect() {
                AppError::completion_unavailable(format!(
                    "Cannot connect to completion backend. Is Ollama running at {}?",
                    self.config.base_url
                ))
            } else if e.is_timeout() {
                AppError::completion_unavailable("Completion backend timed out")
            } else {
                AppError::completion_unavailable(format!("Failed to reach backend: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read completion response: {e}");
            AppError::completion_unavailable(format!("Failed to read backend response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse completion response: {e} - body: {}",
                &body[..body.len().min(500)]
            );
            AppError::completion_unavailable(format!("Failed to parse backend response: {e}"))
        })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::completion_unavailable("Backend returned no choices"))?;

        debug!(
            content_len = choice.message.content.as_ref().map_or(0, String::len),
            finish_reason = ?choice.finish_reason,
            "Received completion"
        );

        choice
            .message
            .content
            .ok_or_else(|| AppError::completion_unavailable("Backend returned no content"))
    }

    async fn health_check(&self) -> bool {
        let request = self.client.get(self.api_url("models"));
        match self.add_auth_header(request).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Engine health probe failed: {e}");
                false
            }
        }
    }
}
