//! Cache Layer Module
//!
//! Cache-aside memoization on top of the shared key-value table.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cache::entry::row_id;
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};
use crate::clock::Clock;
use crate::error::Result;
use crate::storage::{KvTable, TableError};

// == Cache Layer ==
/// TTL cache keyed by caller-supplied strings.
///
/// Population is the caller's job: the layer never fetches on a miss.
/// Expired rows are ignored on read and left in the table; a later `put`
/// overwrites them.
#[derive(Clone)]
pub struct CacheLayer {
    table: Arc<dyn KvTable>,
    clock: Arc<dyn Clock>,
    stats: Arc<StatsRecorder>,
}

impl CacheLayer {
    // == Constructor ==
    pub fn new(table: Arc<dyn KvTable>, clock: Arc<dyn Clock>) -> Self {
        Self {
            table,
            clock,
            stats: Arc::new(StatsRecorder::default()),
        }
    }

    // == Put ==
    /// Stores `payload` under `key` for `ttl_seconds`.
    ///
    /// Overwrites unconditionally; the last writer wins.
    pub async fn put<T>(&self, key: &str, payload: &T, ttl_seconds: u64) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let id = row_id(key);
        let data = serde_json::to_value(payload).map_err(|e| TableError::malformed(&id, e))?;
        let entry = CacheEntry::new(key, data, self.clock.now_epoch_secs(), ttl_seconds);
        let row = serde_json::to_value(&entry).map_err(|e| TableError::malformed(&id, e))?;

        self.table.put(&id, row).await.inspect_err(|e| {
            error!("Error storing cache with key {}: {}", key, e);
        })?;
        self.stats.record_write();
        debug!(key, ttl_seconds, expires_at = entry.expires_at, "cache entry stored");
        Ok(())
    }

    // == Get ==
    /// Returns the live payload under `key`, or `None` on a miss.
    ///
    /// Absent, expired and undecodable rows are all misses.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let id = row_id(key);
        let row = self.table.get(&id).await.inspect_err(|e| {
            error!("Error fetching cache with key {}: {}", key, e);
        })?;

        let Some(row) = row else {
            self.stats.record_miss();
            debug!(key, "cache miss");
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_value(row) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, "ignoring malformed cache row: {}", e);
                self.stats.record_miss();
                return Ok(None);
            }
        };

        if entry.is_expired(self.clock.now_epoch_secs()) {
            self.stats.record_expired();
            debug!(key, expires_at = entry.expires_at, "cache entry expired");
            return Ok(None);
        }

        match serde_json::from_value(entry.data) {
            Ok(payload) => {
                self.stats.record_hit();
                debug!(key, "cache hit");
                Ok(Some(payload))
            }
            Err(e) => {
                warn!(key, "ignoring cache payload of unexpected shape: {}", e);
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::AppError;
    use crate::storage::InMemoryTable;
    use chrono::Duration;
    use serde_json::{json, Value};

    fn cache_with_clock() -> (CacheLayer, Arc<ManualClock>, Arc<InMemoryTable>) {
        let table = Arc::new(InMemoryTable::new());
        let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
        (CacheLayer::new(table.clone(), clock.clone()), clock, table)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (cache, _, _) = cache_with_clock();

        cache.put("users", &vec!["a", "b"], 300).await.unwrap();
        let hit: Option<Vec<String>> = cache.get("users").await.unwrap();

        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_get_absent_is_miss() {
        let (cache, _, _) = cache_with_clock();

        let miss: Option<Value> = cache.get("nothing").await.unwrap();
        assert!(miss.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_but_kept() {
        let (cache, clock, table) = cache_with_clock();
        cache.put("users", &json!([1]), 300).await.unwrap();

        clock.advance(Duration::seconds(299));
        assert!(cache.get::<Value>("users").await.unwrap().is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get::<Value>("users").await.unwrap().is_none());

        // Lazy expiry: the stale row is still in the table.
        assert!(table.get("cache:users").await.unwrap().is_some());
        assert_eq!(cache.stats().expired, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_resets_ttl() {
        let (cache, clock, _) = cache_with_clock();
        cache.put("k", &1, 10).await.unwrap();
        clock.advance(Duration::seconds(8));
        cache.put("k", &2, 10).await.unwrap();
        clock.advance(Duration::seconds(8));

        assert_eq!(cache.get::<i32>("k").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_rows_are_namespaced() {
        let (cache, _, table) = cache_with_clock();
        cache.put("abc", &"v", 60).await.unwrap();

        assert!(table.get("abc").await.unwrap().is_none());
        let row = table.get("cache:abc").await.unwrap().unwrap();
        assert_eq!(row["expiresAt"], 1_700_000_060);
    }

    #[tokio::test]
    async fn test_malformed_row_is_miss() {
        let (cache, _, table) = cache_with_clock();
        table.put("cache:k", json!({"garbage": true})).await.unwrap();

        assert!(cache.get::<Value>("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_payload_of_wrong_shape_is_miss() {
        let (cache, _, _) = cache_with_clock();
        cache.put("k", &"not a number", 60).await.unwrap();

        assert!(cache.get::<u64>("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_writes() {
        let (cache, _, _) = cache_with_clock();
        cache.put("k", &1, 60).await.unwrap();
        cache.get::<i32>("k").await.unwrap();
        cache.get::<i32>("k").await.unwrap();
        cache.get::<i32>("other").await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_clones_share_stats() {
        let (cache, _, _) = cache_with_clock();
        let clone = cache.clone();
        clone.put("k", &1, 60).await.unwrap();

        assert_eq!(cache.stats().writes, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_persistence_error() {
        struct Down;

        #[async_trait::async_trait]
        impl KvTable for Down {
            async fn get(&self, id: &str) -> std::result::Result<Option<Value>, TableError> {
                Err(TableError::backend(id, "down"))
            }
            async fn put(&self, id: &str, _: Value) -> std::result::Result<(), TableError> {
                Err(TableError::backend(id, "down"))
            }
            async fn scan(&self) -> std::result::Result<Vec<(String, Value)>, TableError> {
                Ok(Vec::new())
            }
            async fn delete(&self, _: &str) -> std::result::Result<bool, TableError> {
                Ok(false)
            }
        }

        let cache = CacheLayer::new(Arc::new(Down), Arc::new(ManualClock::default()));
        assert!(matches!(
            cache.put("k", &1, 1).await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            cache.get::<i32>("k").await,
            Err(AppError::Persistence(_))
        ));
    }
}
