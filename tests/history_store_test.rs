// ABOUTME: Integration tests for the SQLite history store
// ABOUTME: Covers append-only ordering, sequence reuse, ownership claims, and deletion
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::create_test_database;
use pcgenie::database::{Database, HistoryStore, SqliteHistoryStore};
use pcgenie::models::Sender;

use std::time::Duration;

async fn sqlite_store() -> SqliteHistoryStore {
    let database = create_test_database().await.unwrap();
    SqliteHistoryStore::new(database.pool().clone())
}

// ============================================================================
// Append-Only Log
// ============================================================================

#[tokio::test]
async fn test_append_assigns_increasing_sequences() {
    let store = sqlite_store().await;

    let s1 = store.append("c1", Sender::User, "first").await.unwrap();
    let s2 = store.append("c1", Sender::Assistant, "second").await.unwrap();
    let s3 = store.append("c1", Sender::User, "third").await.unwrap();

    assert!(s1 < s2 && s2 < s3);

    let messages = store.list("c1").await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].text, "first");
    assert_eq!(messages[1].text, "second");
    assert_eq!(messages[2].text, "third");
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].sender, Sender::Assistant);
}

#[tokio::test]
async fn test_sequences_are_never_reused_after_delete() {
    let store = sqlite_store().await;

    store.append("c1", Sender::User, "a").await.unwrap();
    let before = store.append("c1", Sender::Assistant, "b").await.unwrap();

    store.delete("c1").await.unwrap();
    assert!(store.list("c1").await.unwrap().is_empty());

    let after = store.append("c1", Sender::User, "c").await.unwrap();
    assert!(
        after > before,
        "sequence {after} must exceed the pre-delete maximum {before}"
    );
}

#[tokio::test]
async fn test_conversations_do_not_leak_into_each_other() {
    let store = sqlite_store().await;

    store.append("c1", Sender::User, "for c1").await.unwrap();
    store.append("c2", Sender::User, "for c2").await.unwrap();
    store.append("c1", Sender::Assistant, "also c1").await.unwrap();

    let c1 = store.list("c1").await.unwrap();
    let c2 = store.list("c2").await.unwrap();
    assert_eq!(c1.len(), 2);
    assert_eq!(c2.len(), 1);
    assert!(c1.iter().all(|m| m.conversation_id == "c1"));
    assert_eq!(c2[0].text, "for c2");
}

// ============================================================================
// Ownership Claims
// ============================================================================

#[tokio::test]
async fn test_claim_is_first_wins_and_idempotent() {
    let store = sqlite_store().await;

    store.claim("c1", "alice").await.unwrap();
    // Repeat claim by the same owner is a no-op
    store.claim("c1", "alice").await.unwrap();
    // A competing claim does not steal the conversation
    store.claim("c1", "mallory").await.unwrap();

    assert_eq!(store.owner("c1").await.unwrap().as_deref(), Some("alice"));

    let alice = store.list_conversations("alice").await.unwrap();
    assert_eq!(alice.len(), 1);
    assert!(store.list_conversations("mallory").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_of_unknown_conversation_is_none() {
    let store = sqlite_store().await;
    assert!(store.owner("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_conversations_newest_first() {
    let store = sqlite_store().await;

    store.claim("older", "alice").await.unwrap();
    // Separate the created_at timestamps
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.claim("newer", "alice").await.unwrap();

    let conversations = store.list_conversations("alice").await.unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].conversation_id, "newer");
    assert_eq!(conversations[1].conversation_id, "older");
}

#[tokio::test]
async fn test_delete_removes_transcript_and_ownership() {
    let store = sqlite_store().await;

    store.claim("c1", "alice").await.unwrap();
    store.append("c1", Sender::User, "hello").await.unwrap();
    store.append("c1", Sender::Assistant, "hi").await.unwrap();

    store.delete("c1").await.unwrap();

    assert!(store.list("c1").await.unwrap().is_empty());
    assert!(store.owner("c1").await.unwrap().is_none());
    assert!(store.list_conversations("alice").await.unwrap().is_empty());
}

// ============================================================================
// File-Backed Databases
// ============================================================================

#[tokio::test]
async fn test_file_database_is_created_on_open() {
    common::init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pcgenie-test.db");
    let url = format!("sqlite:{}", db_path.display());

    let database = Database::new(&url).await.unwrap();
    assert!(db_path.exists(), "mode=rwc must create the database file");

    let store = SqliteHistoryStore::new(database.pool().clone());
    store.append("c1", Sender::User, "persisted").await.unwrap();
    let messages = store.list("c1").await.unwrap();
    assert_eq!(messages[0].text, "persisted");
}
