// src/store/mod.rs

//! Persistent key-value storage seam.
//!
//! Every component reads and writes whole JSON documents under a fixed key
//! (read entire collection, mutate in memory, write entire collection).

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const DIRECTORY_KEY: &str = "directory";
pub const SESSION_KEY: &str = "session";
pub const QUIZ_HISTORY_KEY: &str = "quizHistory";
pub const PAYMENT_LEDGER_KEY: &str = "paymentLedger";

/// Key of the attendance ledger for one course offering.
pub fn attendance_key(course_code: &str) -> String {
    format!("attendance:{}", course_code)
}

/// Durable, string-keyed store holding JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Reads and decodes the document under `key`.
///
/// Content that fails to decode is logged and reported as absent, so callers
/// fall back to their empty or seeded state instead of failing.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("Discarding malformed value under '{}': {}", key, e);
            Ok(None)
        }
    }
}

pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_json_treats_garbage_as_absent() {
        let store = MemoryStore::new();
        store.set("directory", "{not json").await.unwrap();

        let loaded: Option<Vec<String>> = load_json(&store, "directory").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, "quizHistory", &vec![1, 2, 3]).await.unwrap();

        let loaded: Option<Vec<u32>> = load_json(&store, "quizHistory").await.unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_attendance_key() {
        assert_eq!(attendance_key("INF-001"), "attendance:INF-001");
    }
}
