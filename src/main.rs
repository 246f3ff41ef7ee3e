//! htmlup Server
//!
//! Upload HTML pages to S3-compatible storage and serve them back by name.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use htmlup_server::config::Config;
use htmlup_server::routes;
use htmlup_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "htmlup_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting htmlup Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        provider = ?config.storage.provider,
        namespace = %config.storage.namespace,
        policy = ?config.upload.collision_policy,
        resolution = ?config.pages.resolution,
        "Storage configured"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", config.server.host, config.server.port)
        })?;

    let app_state = AppState::from_config(config)
        .await
        .context("Failed to initialize storage")?;

    // Initial page enumeration
    if app_state.resolver().strategy().prefetches_index() {
        match app_state.resolver().refresh_index().await {
            Ok(count) => tracing::info!("Page index initialized with {} pages", count),
            Err(e) => tracing::warn!(
                "Initial page enumeration failed: {}. Will retry on /api/pages/refresh",
                e
            ),
        }
    }

    let app = routes::app(app_state);

    tracing::info!("htmlup Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
