// ABOUTME: Server binary wiring configuration, storage, and the chat pipeline together
// ABOUTME: Serves the REST/SSE API over axum with graceful ctrl-c shutdown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![recursion_limit = "256"]

//! # PCGenie Server Binary
//!
//! Starts the PCGenie chat API: user authentication, SQLite-backed
//! conversation history, and streaming replies from an OpenAI-compatible
//! completion endpoint.

use anyhow::Result;
use clap::Parser;
use pcgenie::{
    auth::{self, AuthManager},
    chat::ContextManager,
    config::environment::ServerConfig,
    constants::env_names,
    database::{Database, SqliteHistoryStore, UserManager},
    llm::{CompletionEngine, OllamaEngine},
    logging,
    routes::{self, AppState},
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pcgenie-server")]
#[command(about = "PCGenie - streaming chat assistant for PC component advice")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using configuration from environment");
            Args { http_port: None }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting PCGenie server");
    info!("{}", config.summary());

    let jwt_secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!(
            "{} is not set; using a generated secret, sessions will not survive a restart",
            env_names::JWT_SECRET
        );
        auth::generate_jwt_secret()
    });

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database ready: {}", config.database.url);

    let history: Arc<dyn pcgenie::database::HistoryStore> =
        Arc::new(SqliteHistoryStore::new(database.pool().clone()));
    let engine: Arc<dyn CompletionEngine> = Arc::new(OllamaEngine::new(config.engine.clone())?);

    let state = Arc::new(AppState {
        users: UserManager::new(database.pool().clone()),
        history: Arc::clone(&history),
        auth: AuthManager::new(&jwt_secret, config.auth.jwt_expiry_hours),
        chat: ContextManager::new(history, Arc::clone(&engine), config.chat.token_delay()),
        engine,
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    display_available_endpoints(&config);
    info!("PCGenie listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PCGenie server stopped");
    Ok(())
}

/// Resolve when ctrl-c is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install ctrl-c handler: {e}");
        // Fall through and keep serving; the process can still be killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Display all available API endpoints
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    info!("Authentication:");
    info!("   Register:          POST http://{host}:{port}/api/auth/register");
    info!("   Login:             POST http://{host}:{port}/api/auth/login");
    info!("   Guest Session:     POST http://{host}:{port}/api/auth/guest");
    info!("   Reset Password:    POST http://{host}:{port}/api/auth/reset-password");
    info!("Conversations:");
    info!("   List:              GET  http://{host}:{port}/api/conversations");
    info!("   Create:            POST http://{host}:{port}/api/conversations");
    info!("   Transcript:        GET  http://{host}:{port}/api/conversations/{{id}}/messages");
    info!("   Send (SSE reply):  POST http://{host}:{port}/api/conversations/{{id}}/messages");
    info!("   Delete:            DELETE http://{host}:{port}/api/conversations/{{id}}");
    info!("Monitoring:");
    info!("   Health Check:      GET  http://{host}:{port}/health");
    info!("=== End of Endpoint List ===");
}
