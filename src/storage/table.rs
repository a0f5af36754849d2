//! Key-Value Table Trait
//!
//! Backends are dumb document stores: they never interpret the rows they
//! hold. Timestamps, merge rules and expiry live in the task store and the
//! cache layer.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// == Table Error ==
/// Failure of the underlying storage to complete a read or write.
#[derive(Error, Debug)]
pub enum TableError {
    /// The backend could not be reached or rejected the request.
    #[error("storage backend error for `{key}`: {message}")]
    Backend { key: String, message: String },

    /// A stored row could not be encoded or decoded.
    #[error("malformed row `{key}`: {message}")]
    Malformed { key: String, message: String },
}

impl TableError {
    /// Shortcut for a backend failure on `key`.
    pub fn backend(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Backend {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Shortcut for a row that failed to (de)serialize.
    pub fn malformed(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Malformed {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

// == KvTable Trait ==
/// A single table keyed by a string `id`.
///
/// Single-key reads and writes are atomic per row; nothing else is
/// guaranteed. Implementations must be shareable across request handlers.
#[async_trait]
pub trait KvTable: Send + Sync {
    /// Returns the row stored under `id`, or `None` when absent.
    async fn get(&self, id: &str) -> Result<Option<Value>, TableError>;

    /// Stores `item` under `id`, replacing any existing row.
    async fn put(&self, id: &str, item: Value) -> Result<(), TableError>;

    /// Returns every row in the table, in no particular order.
    async fn scan(&self) -> Result<Vec<(String, Value)>, TableError>;

    /// Removes the row under `id`. Returns whether a row was present.
    async fn delete(&self, id: &str) -> Result<bool, TableError>;
}
