//! Taskhub - A task tracking backend
//!
//! Serves task CRUD, attachment URLs and a cached external users view.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use taskhub::startup::{build_state, init_tracing};
use taskhub::{create_router, Config};

/// Main entry point for the Taskhub server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the storage backends and the external API client
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting Taskhub server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, backend={:?}, table={}, bucket={}, cache_ttl={}s",
        config.server_port,
        config.storage_backend,
        config.table_name,
        config.bucket_name,
        config.api_cache_ttl
    );

    let state = build_state(&config).await?;
    info!("Application state initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
