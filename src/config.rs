//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Where tasks, cache rows and attachments live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local table and object store
    Memory,
    /// DynamoDB table and S3 bucket
    Aws,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "aws" => Ok(StorageBackend::Aws),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// AWS region, also used to build public attachment URLs
    pub aws_region: String,
    /// Table holding tasks and cache rows
    pub table_name: String,
    /// Bucket holding attachments
    pub bucket_name: String,
    /// Base URL of the external collection API
    pub external_api_url: String,
    /// TTL in seconds for cached external responses
    pub api_cache_ttl: u64,
    /// Storage backend selection
    pub storage_backend: StorageBackend,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `AWS_REGION` - Region (default: us-east-1)
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: tasks)
    /// - `S3_BUCKET_NAME` - Attachment bucket (default: task-attachments)
    /// - `EXTERNAL_API_URL` - External API base (default: https://jsonplaceholder.typicode.com)
    /// - `API_CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `STORAGE_BACKEND` - `memory` or `aws` (default: memory)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            aws_region: env::var("AWS_REGION").unwrap_or(defaults.aws_region),
            table_name: env::var("DYNAMODB_TABLE_NAME").unwrap_or(defaults.table_name),
            bucket_name: env::var("S3_BUCKET_NAME").unwrap_or(defaults.bucket_name),
            external_api_url: env::var("EXTERNAL_API_URL").unwrap_or(defaults.external_api_url),
            api_cache_ttl: parsed("API_CACHE_TTL").unwrap_or(defaults.api_cache_ttl),
            storage_backend: parsed("STORAGE_BACKEND").unwrap_or(defaults.storage_backend),
        }
    }
}

fn parsed<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            aws_region: "us-east-1".to_string(),
            table_name: "tasks".to_string(),
            bucket_name: "task-attachments".to_string(),
            external_api_url: "https://jsonplaceholder.typicode.com".to_string(),
            api_cache_ttl: 300,
            storage_backend: StorageBackend::Memory,
        }
    }
}
