//! Object Gateway Module
//!
//! Decides object keys and public URLs for task attachments and forwards
//! presign/delete requests to the configured provider. The service never
//! touches file bytes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::provider::{ObjectStore, ObjectStoreError};
use crate::clock::Clock;

/// Validity of minted upload and download URLs
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(3600);

// == Upload Target ==
/// A write URL and the key it writes to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub file_key: String,
}

// == Object Location ==
/// Bucket and region used to build public URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub region: String,
}

// == Object Gateway ==
#[derive(Clone)]
pub struct ObjectGateway {
    store: Arc<dyn ObjectStore>,
    location: ObjectLocation,
    clock: Arc<dyn Clock>,
}

impl ObjectGateway {
    pub fn new(store: Arc<dyn ObjectStore>, location: ObjectLocation, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            location,
            clock,
        }
    }

    // == Generate Upload Target ==
    /// Mints a fresh key and a one-hour write URL for `content_type`.
    ///
    /// Whether anything is ever uploaded is not tracked.
    pub async fn generate_upload_target(
        &self,
        content_type: &str,
    ) -> Result<UploadTarget, ObjectStoreError> {
        let file_key = self.new_key();
        let upload_url = self
            .store
            .presign_put(&file_key, content_type, PRESIGNED_URL_TTL)
            .await
            .inspect_err(|e| error!("Error generating upload URL: {}", e))?;

        debug!(key = %file_key, content_type, "upload target minted");
        Ok(UploadTarget {
            upload_url,
            file_key,
        })
    }

    // == Generate Download Target ==
    /// Mints a one-hour read URL for `key`.
    pub async fn generate_download_target(&self, key: &str) -> Result<String, ObjectStoreError> {
        self.store
            .presign_get(key, PRESIGNED_URL_TTL)
            .await
            .inspect_err(|e| error!("Error generating download URL for key {}: {}", key, e))
    }

    // == Public URL ==
    /// Permanent URL of the object stored under `key`.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.location.bucket, self.location.region, key
        )
    }

    /// True if `url` is the public URL of an object in this bucket.
    pub fn owns(&self, url: &str) -> bool {
        url.strip_prefix(&self.public_url(""))
            .is_some_and(|key| !key.is_empty() && !key.contains('/'))
    }

    // == Delete ==
    /// Deletes by bare key or by URL (the key being its last path segment).
    pub async fn delete(&self, key_or_url: &str) -> Result<String, ObjectStoreError> {
        let key = key_from(key_or_url)?;
        self.store
            .delete(key)
            .await
            .inspect_err(|e| error!("Error deleting file with key {}: {}", key, e))?;
        Ok(key.to_string())
    }

    /// `<uuid>-<epoch millis>`; never contains '/'.
    fn new_key(&self) -> String {
        format!("{}-{}", Uuid::new_v4(), self.clock.now().timestamp_millis())
    }
}

/// Extracts an object key from a bare key or a URL.
pub fn key_from(key_or_url: &str) -> Result<&str, ObjectStoreError> {
    let key = match key_or_url.rsplit_once('/') {
        Some((_, last)) => last,
        None => key_or_url,
    };
    if key.is_empty() {
        return Err(ObjectStoreError::InvalidKey(key_or_url.to_string()));
    }
    Ok(key)
}
