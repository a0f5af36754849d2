//! In-Memory Table
//!
//! HashMap-backed table behind a tokio `RwLock`. Default backend for local
//! runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::trace;

use super::table::{KvTable, TableError};

// == In-Memory Table ==
/// Process-local key-value table.
#[derive(Debug, Default)]
pub struct InMemoryTable {
    rows: RwLock<HashMap<String, Value>>,
}

impl InMemoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored rows, cache rows included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns true if the table holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl KvTable for InMemoryTable {
    async fn get(&self, id: &str) -> Result<Option<Value>, TableError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn put(&self, id: &str, item: Value) -> Result<(), TableError> {
        trace!(id, "put row");
        self.rows.write().await.insert(id.to_string(), item);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<(String, Value)>, TableError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, TableError> {
        trace!(id, "delete row");
        Ok(self.rows.write().await.remove(id).is_some())
    }
}
