//! GigBoard notification server.
//!
//! Main entry point that wires the notification store, realtime engine and
//! HTTP API together and serves them until a shutdown signal arrives.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

use gigboard_api::{AppState, build_router};
use gigboard_core::config::AppConfig;
use gigboard_core::error::AppError;
use gigboard_database::build_store;
use gigboard_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("GIGBOARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting GigBoard notifications v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Notification store ───────────────────────────────
    tracing::info!(provider = ?config.store.provider, "Initializing notification store...");
    let (store, db_pool) = build_store(&config.store, &config.database).await?;
    tracing::info!(provider = store.provider_name(), "Notification store ready");

    // ── Step 2: Realtime engine ──────────────────────────────────
    let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), store.clone()));

    // ── Step 3: HTTP router ──────────────────────────────────────
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), store, engine.clone());
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(
        addr = %addr,
        ws_path = %config.realtime.ws_path,
        "GigBoard server listening"
    );

    // ── Step 4: Serve until signalled ────────────────────────────
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    // ── Step 5: Close sockets, drain HTTP, release the pool ──────
    engine.shutdown();
    let _ = stop_tx.send(());

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server error"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server task failed"),
        Err(_) => tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Grace period elapsed with connections still open"
        ),
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("GigBoard server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
}
