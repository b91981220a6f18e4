// ABOUTME: Conversation endpoints for browsing, creating, deleting, and messaging
// ABOUTME: Streams assistant replies over SSE as JSON token/done/error events
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures_util::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::auth::Claims;
use crate::constants::messages;
use crate::errors::AppError;
use crate::models::{ConversationSummary, Sender, StoredMessage};
use crate::routes::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for conversation creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConversationResponse {
    /// Id of the new conversation
    pub conversation_id: String,
}

/// Response for conversation deletion
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteConversationResponse {
    /// Always true on success
    pub success: bool,
}

/// Request to send one user message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub text: String,
}

// ============================================================================
// Routes
// ============================================================================

/// Conversation and messaging endpoints
pub struct ChatRoutes;

impl ChatRoutes {
    /// Register the `/api/conversations` routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/api/conversations",
                get(Self::list_conversations).post(Self::create_conversation),
            )
            .route(
                "/api/conversations/:conversation_id",
                delete(Self::delete_conversation),
            )
            .route(
                "/api/conversations/:conversation_id/messages",
                get(Self::get_messages).post(Self::send_message),
            )
            .with_state(state)
    }

    /// Open a new conversation owned by the caller.
    ///
    /// Account holders get the canned welcome seeded as the first assistant
    /// turn; guest conversations start empty.
    async fn create_conversation(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let claims = state.auth.authenticate(&headers)?;

        let conversation_id = Uuid::new_v4().to_string();
        state.history.claim(&conversation_id, claims.owner()).await?;

        if !claims.guest {
            state
                .history
                .append(&conversation_id, Sender::Assistant, messages::WELCOME_MESSAGE)
                .await?;
        }

        info!(
            owner = %claims.owner(),
            conversation_id = %conversation_id,
            "Created conversation"
        );

        let response = CreateConversationResponse { conversation_id };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// List the caller's conversations, newest first.
    ///
    /// Guest sessions always see an empty list; their conversations are not
    /// browsable even within the session that created them.
    async fn list_conversations(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Json<Vec<ConversationSummary>>, AppError> {
        let claims = state.auth.authenticate(&headers)?;

        if claims.guest {
            return Ok(Json(Vec::new()));
        }

        let conversations = state.history.list_conversations(claims.owner()).await?;
        Ok(Json(conversations))
    }

    /// Return the full transcript of one conversation in insertion order.
    async fn get_messages(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Json<Vec<StoredMessage>>, AppError> {
        let claims = state.auth.authenticate(&headers)?;
        authorize_owner(&state, &claims, &conversation_id).await?;

        let transcript = state.history.list(&conversation_id).await?;
        Ok(Json(transcript))
    }

    /// Delete a conversation and its entire transcript.
    async fn delete_conversation(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Json<DeleteConversationResponse>, AppError> {
        let claims = state.auth.authenticate(&headers)?;
        authorize_owner(&state, &claims, &conversation_id).await?;

        state.history.delete(&conversation_id).await?;

        info!(
            owner = %claims.owner(),
            conversation_id = %conversation_id,
            "Deleted conversation"
        );
        Ok(Json(DeleteConversationResponse { success: true }))
    }

    /// Submit a user message and stream the assistant's reply over SSE.
    ///
    /// Each SSE data payload is a JSON object tagged by `type`:
    /// `token` carries one reply fragment, `done` closes with the full reply,
    /// and `error` reports a failure after streaming has begun. Failures
    /// before the first token (validation, backend errors) surface as a
    /// regular JSON error response instead.
    async fn send_message(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
        let claims = state.auth.authenticate(&headers)?;
        authorize_owner(&state, &claims, &conversation_id).await?;

        if request.text.trim().is_empty() {
            return Err(AppError::invalid_input("Message text must not be empty"));
        }

        let mut reply_stream = state.chat.respond(&conversation_id, &request.text).await?;

        let stream = async_stream::stream! {
            let mut reply = String::new();
            while let Some(item) = reply_stream.next().await {
                match item {
                    Ok(token) => {
                        reply.push_str(&token);
                        let event = serde_json::json!({
                            "type": "token",
                            "token": token,
                        });
                        yield Ok(Event::default().data(event.to_string()));
                    }
                    Err(e) => {
                        let event = serde_json::json!({
                            "type": "error",
                            "message": e.to_string(),
                        });
                        yield Ok(Event::default().data(event.to_string()));
                        return;
                    }
                }
            }

            let done = serde_json::json!({
                "type": "done",
                "reply": reply.trim(),
            });
            yield Ok(Event::default().data(done.to_string()));
        };

        Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
    }
}

/// Confirm the caller owns `conversation_id` before any read or write.
async fn authorize_owner(
    state: &AppState,
    claims: &Claims,
    conversation_id: &str,
) -> Result<(), AppError> {
    let owner = state
        .history
        .owner(conversation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Conversation"))?;

    if owner != claims.owner() {
        return Err(AppError::permission_denied(
            "Conversation belongs to another account",
        ));
    }
    Ok(())
}
