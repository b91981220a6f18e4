// ABOUTME: Authentication endpoints for registration, login, guest sessions, and password reset
// ABOUTME: Issues JWT session tokens as both response bodies and HttpOnly cookies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{self, SessionToken, AUTH_COOKIE_NAME};
use crate::errors::AppError;
use crate::models::User;
use crate::routes::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a new account
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// Response for account creation
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// New user's id
    pub user_id: String,
    /// Registered username
    pub username: String,
}

/// Request to authenticate an existing account
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account username
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Caller identity echoed back with a session
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject of the session token
    pub user_id: String,
    /// Display name
    pub username: String,
    /// Whether this is an anonymous guest session
    pub guest: bool,
}

/// Response carrying a freshly minted session
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// JWT session token
    pub token: String,
    /// RFC 3339 expiry of the token
    pub expires_at: String,
    /// Who the session belongs to
    pub user: UserInfo,
}

/// Request to replace an account's password
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Account username
    pub username: String,
    /// Replacement plaintext password
    pub new_password: String,
}

/// Response for a password reset
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetPasswordResponse {
    /// Always true on success
    pub success: bool,
}

// ============================================================================
// Routes
// ============================================================================

/// Authentication endpoints
pub struct AuthRoutes;

impl AuthRoutes {
    /// Register the `/api/auth` routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .route("/api/auth/guest", post(Self::guest))
            .route("/api/auth/reset-password", post(Self::reset_password))
            .with_state(state)
    }

    /// Create a new user account.
    ///
    /// Returns 201 with the new user's id, or 409 when the username is taken.
    async fn register(
        State(state): State<Arc<AppState>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        info!("Registration attempt for username: {}", request.username);

        auth::validate_username(&request.username)?;
        auth::validate_password(&request.password)?;

        let password_hash = auth::hash_password(&request.password)?;
        let user = User::new(request.username, password_hash);
        state.users.create_user(&user).await?;

        info!("User registered: {} ({})", user.username, user.id);

        let response = RegisterResponse {
            user_id: user.id.to_string(),
            username: user.username,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Authenticate a username/password pair and mint a session token.
    async fn login(
        State(state): State<Arc<AppState>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        info!("Login attempt for username: {}", request.username);

        let user = state
            .users
            .get_user_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid username or password"))?;

        // bcrypt verification is CPU-heavy; keep it off the async runtime
        let password = request.password;
        let password_hash = user.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || auth::verify_password(&password, &password_hash))
                .await
                .map_err(|e| {
                    AppError::internal(format!("Password verification task failed: {e}"))
                })??;

        if !is_valid {
            warn!("Invalid password for username: {}", request.username);
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let user_id = user.id.to_string();
        let session = state.auth.create_session(&user_id, &user.username, false)?;

        info!("User logged in: {} ({user_id})", user.username);
        session_response(session, user_id, user.username, false)
    }

    /// Mint an anonymous guest session. No account row is created.
    async fn guest(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
        let guest_id = auth::generate_guest_id();
        let session = state.auth.create_session(&guest_id, "Guest", true)?;

        info!("Guest session issued: {guest_id}");
        session_response(session, guest_id, "Guest".to_owned(), true)
    }

    /// Replace the password of an existing account.
    async fn reset_password(
        State(state): State<Arc<AppState>>,
        Json(request): Json<ResetPasswordRequest>,
    ) -> Result<Json<ResetPasswordResponse>, AppError> {
        auth::validate_password(&request.new_password)?;

        let password_hash = auth::hash_password(&request.new_password)?;
        let updated = state
            .users
            .update_password(&request.username, &password_hash)
            .await?;
        if !updated {
            return Err(AppError::not_found("Username"));
        }

        info!("Password reset for username: {}", request.username);
        Ok(Json(ResetPasswordResponse { success: true }))
    }
}

/// Build the session response body and attach the token as an HttpOnly
/// cookie. Cookie lifetime tracks the token expiry.
fn session_response(
    session: SessionToken,
    user_id: String,
    username: String,
    guest: bool,
) -> Result<Response, AppError> {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "{AUTH_COOKIE_NAME}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}",
        session.token
    );

    let body = LoginResponse {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
        user: UserInfo {
            user_id,
            username,
            guest,
        },
    };

    let mut response = (StatusCode::OK, Json(body)).into_response();
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Failed to build session cookie: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}
