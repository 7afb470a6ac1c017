// tests/sqlite_store_tests.rs

use std::sync::Arc;

use academy::{
    config::Config,
    services::{Academy, certificate::MemoryDocumentStore, quiz_generator::DisabledGenerator},
    store::{KeyValueStore, SqliteStore},
};
use sqlx::sqlite::SqlitePoolOptions;

/// Single connection: every connection to `sqlite::memory:` is its own database.
async fn memory_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    SqliteStore::from_pool(pool)
        .await
        .expect("Failed to prepare kv_store table")
}

#[tokio::test]
async fn get_set_remove() {
    let store = memory_store().await;

    assert_eq!(store.get("missing").await.unwrap(), None);

    store.set("session", r#"{"a":1}"#).await.unwrap();
    assert_eq!(store.get("session").await.unwrap().as_deref(), Some(r#"{"a":1}"#));

    // Upsert replaces the value
    store.set("session", r#"{"a":2}"#).await.unwrap();
    assert_eq!(store.get("session").await.unwrap().as_deref(), Some(r#"{"a":2}"#));

    store.remove("session").await.unwrap();
    assert_eq!(store.get("session").await.unwrap(), None);

    // Removing twice is fine
    store.remove("session").await.unwrap();
}

#[tokio::test]
async fn academy_persists_through_sqlite() {
    let store = Arc::new(memory_store().await);
    let academy = Academy::new(
        store.clone(),
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(DisabledGenerator),
        &Config::default(),
    );

    academy.initialize().await.unwrap();
    academy.initialize().await.unwrap();

    let records = academy.directory.load().await.unwrap();
    assert_eq!(records.len(), 702);

    let session = academy.sessions.login("wa-inf-2025-0001").await.unwrap();
    assert_eq!(session.user.name, "Bertony Pompee");

    let raw = store.get("session").await.unwrap().unwrap();
    assert!(raw.contains("WA-INF-2025-0001"));
}
