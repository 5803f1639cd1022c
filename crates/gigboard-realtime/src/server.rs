//! Top-level realtime engine that wires the registry, broadcaster,
//! gateway and notification service together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use gigboard_core::config::RealtimeConfig;
use gigboard_database::store::NotificationStore;

use crate::broadcast::Broadcaster;
use crate::connection::ConnectionRegistry;
use crate::gateway::RealtimeGateway;
use crate::metrics::RealtimeMetrics;
use crate::notification::service::NotificationService;

/// Central realtime engine, constructed once at startup.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Open connections by user.
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out to a user's connections.
    pub broadcaster: Broadcaster,
    /// Connection lifecycle and inbound frames.
    pub gateway: RealtimeGateway,
    /// Event catalog: persist then push.
    pub notifications: NotificationService,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new engine over the given notification store.
    pub fn new(config: RealtimeConfig, store: Arc<dyn NotificationStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry.clone(), metrics.clone());
        let gateway = RealtimeGateway::new(
            config.clone(),
            registry.clone(),
            broadcaster.clone(),
            store.clone(),
            metrics.clone(),
        );
        let notifications = NotificationService::new(store, broadcaster.clone(), metrics.clone());

        info!(
            channel_buffer_size = config.channel_buffer_size,
            "Realtime engine initialized"
        );

        Self {
            registry,
            broadcaster,
            gateway,
            notifications,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Realtime configuration the engine was built with.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns a shutdown receiver for socket loops to watch.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every open socket to close and empty the registry.
    pub fn shutdown(&self) {
        info!(
            connections = self.registry.connection_count(),
            "Shutting down realtime engine"
        );
        let _ = self.shutdown_tx.send(());
        for handle in self.registry.drain() {
            handle.mark_closed();
            self.metrics.connection_closed();
        }
        info!("Realtime engine shut down");
    }
}
