// ABOUTME: HTTP route registration and shared application state
// ABOUTME: Assembles auth and chat routers behind CORS and request tracing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod auth;
pub mod chat;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthManager;
use crate::chat::ContextManager;
use crate::database::{HistoryStore, UserManager};
use crate::llm::CompletionEngine;

pub use auth::AuthRoutes;
pub use chat::ChatRoutes;

/// Shared resources handed to every request handler.
pub struct AppState {
    /// User account storage
    pub users: UserManager,
    /// Conversation transcript storage
    pub history: Arc<dyn HistoryStore>,
    /// Session token issuing and validation
    pub auth: AuthManager,
    /// Context assembly and reply pipeline
    pub chat: ContextManager,
    /// Completion backend, probed by the health endpoint
    pub engine: Arc<dyn CompletionEngine>,
}

/// Build the full application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(AuthRoutes::routes(Arc::clone(&state)))
        .merge(ChatRoutes::routes(Arc::clone(&state)))
        .merge(health_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors())
}

/// Permissive CORS for browser clients served from another origin.
#[must_use]
pub fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
}

fn health_routes(state: Arc<AppState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness probe. Always 200; the body reports whether the completion
/// backend answered.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let engine_reachable = state.engine.health_check().await;
    let status = if engine_reachable { "ok" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "engine_reachable": engine_reachable,
    }))
}
