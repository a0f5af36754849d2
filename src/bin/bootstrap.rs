//! Taskhub Lambda entry point
//!
//! Serves the same router behind API Gateway through the Lambda runtime.
//! The binary name `bootstrap` is what the custom runtime expects.

use tracing::info;

use taskhub::startup::{build_state, init_tracing};
use taskhub::{create_router, Config};

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    init_tracing();

    let config = Config::from_env();
    info!(
        "Starting Taskhub on Lambda: backend={:?}, table={}, bucket={}",
        config.storage_backend, config.table_name, config.bucket_name
    );

    let state = build_state(&config).await?;
    lambda_http::run(create_router(state)).await
}
