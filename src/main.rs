//! Cache Layer - a best-effort request cache
//!
//! Runs the cache endpoints and a sample handler behind the response cache.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_layer::{api::create_router, spawn_sweep_task, AppState, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache manager from configuration
/// 4. Start the expired-entry sweep, if configured
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM, stop the sweep and clear the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_layer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache layer");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_value_size={}, response_ttl={}ms, max_entries={:?}, sweep_interval={:?}, port={}",
        config.max_value_size,
        config.response_ttl_ms,
        config.max_entries,
        config.sweep_interval,
        config.server_port
    );

    let state = AppState::from_config(&config).context("invalid cache configuration")?;
    let cache = state.cache.clone();
    info!("Cache manager initialized");

    let sweep_handle = config
        .sweep_interval
        .map(|interval| spawn_sweep_task(cache.clone(), interval));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    cache.clear().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
