// ABOUTME: Database operations for user account records
// ABOUTME: Handles account creation, lookup by username, and password updates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::{AppError, AppResult};
use crate::models::User;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// User account database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new user account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the username is taken, or
    /// `HistoryUnavailable` on other database failures
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists(format!("Username {}", user.username))
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(())
    }

    /// Look up a user by username
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| {
            let id: String = r.get("id");
            Ok(User {
                id: Uuid::parse_str(&id)
                    .map_err(|e| AppError::database(format!("Corrupt user id {id}: {e}")))?,
                username: r.get("username"),
                password_hash: r.get("password_hash"),
                created_at: r.get("created_at"),
            })
        })
        .transpose()
    }

    /// Replace the stored password hash for an existing username
    ///
    /// Returns `false` when no account with that username exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_password(&self, username: &str, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $1
            WHERE username = $2
            ",
        )
        .bind(password_hash)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update password: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Detect a SQLite UNIQUE constraint violation
fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}
