//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use gigboard_core::config::AppConfig;
use gigboard_database::store::NotificationStore;
use gigboard_realtime::server::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Notification store (PostgreSQL or in-memory)
    pub store: Arc<dyn NotificationStore>,
    /// Realtime engine: registry, gateway, notification service
    pub engine: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn NotificationStore>,
        engine: Arc<RealtimeEngine>,
    ) -> Self {
        Self {
            config,
            store,
            engine,
            started_at: Instant::now(),
        }
    }
}
