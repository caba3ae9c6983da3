//! Cache-aside restaurant service
//!
//! Serves restaurant lookups cache-first over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_aside::api::create_router;
use cache_aside::cache::{Cache, MemoryCache, RedisCache};
use cache_aside::config::CacheBackend;
use cache_aside::restaurant::MemoryRestaurantStore;
use cache_aside::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured cache backend
/// 4. Create the restaurant store
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_aside=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache-aside service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, cache_ttl={}s, op_timeout={}ms, key_scheme={:?}, port={}",
        config.backend,
        config.cache_ttl,
        config.cache.op_timeout.as_millis(),
        config.key_scheme,
        config.server_port
    );

    let (cache, cleanup_handle) = build_cache(&config).await?;
    let store = Arc::new(MemoryRestaurantStore::new());
    let state = AppState::from_config(cache, store, &config);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connects the configured cache backend. The memory backend also gets its
/// expiry sweeper.
async fn build_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn Cache>, Option<JoinHandle<()>>)> {
    match config.backend {
        CacheBackend::Redis => {
            let cache: Arc<dyn Cache> = Arc::new(
                RedisCache::connect(&config.cache)
                    .await
                    .with_context(|| format!("cannot reach redis at {}", config.cache.address))?,
            );
            Ok((cache, None))
        }
        CacheBackend::Memory => {
            let memory = MemoryCache::new();
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("In-memory cache initialized, background cleanup task started");

            let cache: Arc<dyn Cache> = Arc::new(memory);
            Ok((cache, Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
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
                warn!(error = %err, "Failed to install SIGTERM handler");
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
