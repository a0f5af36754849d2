//! Cache Entry Module
//!
//! Row layout for cached payloads stored alongside tasks in the shared table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CACHE_KEY_PREFIX;

// == Cache Entry ==
/// A cached payload with an absolute expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Namespaced row id (`cache:<key>`)
    pub id: String,
    /// The cached payload
    pub data: Value,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry for `key` expiring `ttl_seconds` after `now_secs`.
    pub fn new(key: &str, data: Value, now_secs: i64, ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            id: row_id(key),
            data,
            expires_at: now_secs.saturating_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is valid only while `now < expires_at`; at the boundary it is
    /// already expired.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        now_secs >= self.expires_at
    }
}

// == Utility Functions ==
/// Maps a caller-supplied cache key to its row id.
pub fn row_id(key: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, key)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("users", json!([1, 2]), NOW, 300);

        assert_eq!(entry.id, "cache:users");
        assert_eq!(entry.data, json!([1, 2]));
        assert_eq!(entry.expires_at, NOW + 300);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("k", json!(null), NOW, 10);

        assert!(!entry.is_expired(NOW + 9));
        assert!(entry.is_expired(NOW + 10), "Entry should be expired at boundary");
        assert!(entry.is_expired(NOW + 11));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new("k", json!(null), NOW, 0);
        assert!(entry.is_expired(NOW));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("k", json!(null), NOW, u64::MAX);
        assert_eq!(entry.expires_at, i64::MAX);
    }

    #[test]
    fn test_row_layout() {
        let entry = CacheEntry::new("users", json!([]), NOW, 5);
        let row = serde_json::to_value(&entry).unwrap();

        assert_eq!(row["id"], "cache:users");
        assert_eq!(row["expiresAt"], NOW + 5);
        assert!(row.get("data").is_some());
    }
}
