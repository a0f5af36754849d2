//! In-Memory Object Store
//!
//! Local stand-in for a blob provider. Issues unsigned, expiry-stamped URLs
//! and records deletions so they can be inspected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::sync::RwLock;
use tracing::debug;

use super::provider::{ObjectStore, ObjectStoreError};
use crate::clock::Clock;

/// Default endpoint for locally issued URLs
pub const LOCAL_ENDPOINT: &str = "http://localhost:4566";

// == In-Memory Object Store ==
#[derive(Debug)]
pub struct InMemoryObjectStore {
    endpoint: String,
    bucket: String,
    clock: Arc<dyn Clock>,
    deleted: RwLock<Vec<String>>,
}

impl InMemoryObjectStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            clock,
            deleted: RwLock::new(Vec::new()),
        }
    }

    /// Keys deleted so far, in order.
    pub async fn deleted_keys(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    fn signed_url(
        &self,
        method: &str,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        let base = format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, key);
        let mut url = Url::parse(&base).map_err(|e| ObjectStoreError::Provider(e.to_string()))?;

        let expires_at = self.clock.now_epoch_secs() + expires_in.as_secs() as i64;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("X-Method", method);
            if let Some(content_type) = content_type {
                query.append_pair("X-Content-Type", content_type);
            }
            query.append_pair("X-Expires", &expires_at.to_string());
        }
        Ok(url.into())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        self.signed_url("PUT", key, Some(content_type), expires_in)
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        self.signed_url("GET", key, None, expires_in)
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        debug!(key, bucket = %self.bucket, "object deleted");
        self.deleted.write().await.push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn store() -> InMemoryObjectStore {
        InMemoryObjectStore::new(
            LOCAL_ENDPOINT,
            "bucket",
            Arc::new(ManualClock::at_epoch_secs(1_000)),
        )
    }

    #[tokio::test]
    async fn test_presign_put_url() {
        let url = store()
            .presign_put("k1", "image/png", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:4566/bucket/k1?"));
        assert!(url.contains("X-Method=PUT"));
        assert!(url.contains("X-Content-Type=image%2Fpng"));
        assert!(url.contains("X-Expires=4600"));
    }

    #[tokio::test]
    async fn test_presign_get_url() {
        let url = store()
            .presign_get("k1", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.contains("X-Method=GET"));
        assert!(!url.contains("X-Content-Type"));
        assert!(url.contains("X-Expires=1060"));
    }

    #[tokio::test]
    async fn test_delete_records_key() {
        let store = store();
        store.delete("a").await.unwrap();
        store.delete("b").await.unwrap();

        assert_eq!(store.deleted_keys().await, vec!["a", "b"]);
    }
}
