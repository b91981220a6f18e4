// ABOUTME: JWT-based session management plus password hashing for user accounts
// ABOUTME: Issues and validates HS256 tokens, extracts them from headers or cookies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Authentication and Session Management
//!
//! Sessions are stateless HS256 JWTs carrying the account id (or a
//! `guest_<hex>` subject for guests), the display username, and a `guest`
//! flag. Tokens travel either in the `Authorization: Bearer` header or in
//! the httpOnly `auth_token` cookie set at login; the header wins when both
//! are present. Password hashing is bcrypt at the library default cost.

use std::sync::atomic::{AtomicU64, Ordering};

use bcrypt::DEFAULT_COST;
use chrono::{DateTime, Duration, Utc};
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::constants::{crypto, limits};
use crate::errors::{AppError, AppResult};

/// Name of the session cookie set at login
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// JWT claims for a PCGenie session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, or `guest_<hex>` for guest sessions
    pub sub: String,
    /// Display username
    pub username: String,
    /// Whether this is an ephemeral guest session
    pub guest: bool,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// The owner key used for conversation bookkeeping
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.sub
    }
}

/// A freshly issued session token with its expiry
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Encoded JWT
    pub token: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for JWT sessions and password hashing
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    /// Monotonic counter to ensure unique timestamps for tokens
    token_counter: AtomicU64,
}

impl AuthManager {
    /// Create a new authentication manager from the shared signing secret
    #[must_use]
    pub fn new(jwt_secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Issue a session token for an account or guest subject.
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn create_session(
        &self,
        subject: &str,
        username: &str,
        guest: bool,
    ) -> AppResult<SessionToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);

        // Use atomic counter to ensure unique issued-at times
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: subject.to_owned(),
            username: username.to_owned(),
            guest,
            iat: unique_iat,
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok(SessionToken { token, expires_at })
    }

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    ///
    /// `AuthExpired` for expired tokens, `AuthInvalid` for anything else
    /// wrong with the token.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    warn!("Rejected expired session token");
                    AppError::auth_expired()
                }
                _ => AppError::auth_invalid(format!("Invalid session token: {e}")),
            })
    }

    /// Resolve the caller's claims from request headers.
    ///
    /// The `Authorization: Bearer` header is checked first, then the
    /// `auth_token` cookie.
    ///
    /// # Errors
    ///
    /// `AuthRequired` when neither carrier is present; validation errors as
    /// in [`Self::validate_token`].
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<Claims> {
        let token = bearer_token(headers)
            .or_else(|| get_cookie_value(headers, AUTH_COOKIE_NAME))
            .ok_or_else(AppError::auth_required)?;
        self.validate_token(&token)
    }
}

/// Extract the token from an `Authorization: Bearer` header, if present
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_owned)
}

/// Extract a named cookie value from the `Cookie` header, if present
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// Hash a password with bcrypt at the default cost.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

/// Validate a username against registration rules.
///
/// # Errors
///
/// `InvalidInput` when the username is too short.
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().len() < limits::MIN_USERNAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Username must be at least {} characters",
            limits::MIN_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate a password against registration rules.
///
/// # Errors
///
/// `InvalidInput` when the password is too short.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < limits::MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {} characters",
            limits::MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Mint a fresh guest subject of the form `guest_<8 hex chars>`
#[must_use]
pub fn generate_guest_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("guest_{}", &hex[..limits::GUEST_ID_SUFFIX_LENGTH])
}

/// Generate a random JWT secret for deployments that configure none.
///
/// Sessions signed with it die with the process; fine for development,
/// logged as a warning at startup.
#[must_use]
pub fn generate_jwt_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(crypto::GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use http::HeaderValue;

    fn manager() -> AuthManager {
        AuthManager::new("test-secret-key", 24)
    }

    #[test]
    fn test_session_round_trip() {
        let auth = manager();
        let session = auth.create_session("user-1", "alice", false).unwrap();
        let claims = auth.validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert!(!claims.guest);
        assert_eq!(claims.exp, session.expires_at.timestamp());
    }

    #[test]
    fn test_expired_token_maps_to_auth_expired() {
        // Negative expiry puts exp well past the default validation leeway
        let auth = AuthManager::new("test-secret-key", -2);
        let session = auth.create_session("user-1", "alice", false).unwrap();
        let err = auth.validate_token(&session.token).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::AuthExpired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let session = manager().create_session("user-1", "alice", false).unwrap();
        let other = AuthManager::new("different-secret", 24);
        let err = other.validate_token(&session.token).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_authenticate_prefers_header_over_cookie() {
        let auth = manager();
        let header_session = auth.create_session("header-user", "alice", false).unwrap();
        let cookie_session = auth.create_session("cookie-user", "bob", false).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", header_session.token)).unwrap(),
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("auth_token={}", cookie_session.token)).unwrap(),
        );

        let claims = auth.authenticate(&headers).unwrap();
        assert_eq!(claims.sub, "header-user");
    }

    #[test]
    fn test_authenticate_falls_back_to_cookie() {
        let auth = manager();
        let session = auth.create_session("cookie-user", "bob", true).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("other=1; auth_token={}; theme=dark", session.token))
                .unwrap(),
        );

        let claims = auth.authenticate(&headers).unwrap();
        assert_eq!(claims.sub, "cookie-user");
        assert!(claims.guest);
    }

    #[test]
    fn test_authenticate_without_credentials() {
        let err = manager().authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::AuthRequired);
    }

    #[test]
    fn test_get_cookie_value_missing_name() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(get_cookie_value(&headers, AUTH_COOKIE_NAME).is_none());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_guest_id_shape() {
        let id = generate_guest_id();
        assert!(id.starts_with("guest_"));
        assert_eq!(id.len(), "guest_".len() + limits::GUEST_ID_SUFFIX_LENGTH);
        assert_ne!(id, generate_guest_id());
    }

    #[test]
    fn test_username_and_password_rules() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_generated_secret_length() {
        assert_eq!(generate_jwt_secret().len(), crypto::GENERATED_SECRET_LENGTH);
    }
}
