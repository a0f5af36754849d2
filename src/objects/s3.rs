//! S3 Object Store
//!
//! Presigning and deletion through the AWS SDK. The SDK computes the
//! signatures; this adapter only builds the requests.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use super::provider::{ObjectStore, ObjectStoreError};

// == S3 Object Store ==
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self::new(Client::new(config), bucket)
    }
}

fn presigning(expires_in: Duration) -> Result<PresigningConfig, ObjectStoreError> {
    PresigningConfig::expires_in(expires_in)
        .map_err(|e| ObjectStoreError::Provider(format!("invalid presign expiry: {}", e)))
}

fn provider_error<E: std::error::Error>(op: &str, key: &str, err: E) -> ObjectStoreError {
    ObjectStoreError::Provider(format!("{} `{}`: {}", op, key, DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| provider_error("presign put", key, e))?;
        Ok(request.uri().to_string())
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectStoreError> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning(expires_in)?)
            .await
            .map_err(|e| provider_error("presign get", key, e))?;
        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| provider_error("delete", key, e))?;
        Ok(())
    }
}
