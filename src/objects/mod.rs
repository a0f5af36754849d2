//! Objects Module
//!
//! Attachment handling through pre-signed URLs.

mod gateway;
mod memory;
mod provider;
#[cfg(feature = "aws")]
mod s3;

pub use gateway::{key_from, ObjectGateway, ObjectLocation, UploadTarget, PRESIGNED_URL_TTL};
pub use memory::{InMemoryObjectStore, LOCAL_ENDPOINT};
pub use provider::{ObjectStore, ObjectStoreError};
#[cfg(feature = "aws")]
pub use s3::S3ObjectStore;
