//! Object Store Provider
//!
//! The blob-storage seam. Signing is the provider's business; the gateway
//! only asks for URLs and deletions by key.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// == Object Store Error ==
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    /// The provider failed to presign or delete
    #[error("object storage provider error: {0}")]
    Provider(String),

    /// No usable key could be derived from the input
    #[error("invalid object key: '{0}'")]
    InvalidKey(String),
}

// == Object Store Trait ==
/// A single bucket of opaque, string-keyed objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns a URL allowing one upload of `content_type` to `key`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError>;

    /// Returns a URL allowing reads of `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration)
        -> Result<String, ObjectStoreError>;

    /// Deletes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}
