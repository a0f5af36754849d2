//! Startup Module
//!
//! Logging and state wiring shared by the server and Lambda entry points.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, StorageBackend};
use crate::external::{HttpRemoteSource, RemoteSource};

/// Collection name of the external users API
pub const USERS_COLLECTION: &str = "users";

/// Installs the global tracing subscriber.
///
/// Defaults to "info" level, can be overridden with RUST_LOG env var.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhub=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Builds the application state for the configured backend.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let source: Arc<dyn RemoteSource> = Arc::new(HttpRemoteSource::new(
        reqwest::Client::new(),
        config.external_api_url.clone(),
        USERS_COLLECTION,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory table and object store");
            Ok(AppState::in_memory(config, source, clock))
        }
        #[cfg(feature = "aws")]
        StorageBackend::Aws => {
            use crate::objects::S3ObjectStore;
            use crate::storage::DynamoDbTable;

            let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            info!(
                "Using DynamoDB table {} and S3 bucket {}",
                config.table_name, config.bucket_name
            );
            let table = Arc::new(DynamoDbTable::from_sdk_config(&sdk_config, &config.table_name));
            let objects = Arc::new(S3ObjectStore::from_sdk_config(&sdk_config, &config.bucket_name));
            Ok(AppState::new(config, table, objects, source, clock))
        }
        #[cfg(not(feature = "aws"))]
        StorageBackend::Aws => {
            anyhow::bail!("STORAGE_BACKEND=aws requires building with the `aws` feature")
        }
    }
}
