//! Realtime gateway: connection lifecycle and inbound control frames.
//!
//! A connection moves `Opening -> Open -> Closed`. [`RealtimeGateway::authorize`]
//! guards the first transition, [`RealtimeGateway::open`] performs it, and
//! [`RealtimeGateway::close`] is the terminal step. The socket loop itself
//! lives in the HTTP layer and calls into these methods.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use gigboard_core::config::RealtimeConfig;
use gigboard_core::error::{AppError, ErrorKind};
use gigboard_core::result::AppResult;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_database::store::NotificationStore;

use crate::broadcast::Broadcaster;
use crate::connection::{ConnectionHandle, ConnectionRegistry};
use crate::message::serializer::{deserialize_inbound, serialize_outbound};
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::validate_inbound;
use crate::metrics::RealtimeMetrics;

/// Greeting carried by the `connection_established` frame.
pub const ESTABLISHED_MESSAGE: &str = "Connected to notification service";

/// Owns every connection's lifecycle and routes read-state changes.
#[derive(Debug, Clone)]
pub struct RealtimeGateway {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
    store: Arc<dyn NotificationStore>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl RealtimeGateway {
    /// Creates a new gateway.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        broadcaster: Broadcaster,
        store: Arc<dyn NotificationStore>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            store,
            metrics,
            config,
        }
    }

    /// Resolve the caller-supplied user identifier of an upgrade request.
    ///
    /// A missing, blank, or malformed identifier is an authentication error;
    /// the caller must close the socket with a policy-violation code.
    pub fn authorize(&self, raw_user_id: Option<&str>) -> AppResult<UserId> {
        let result = match raw_user_id.map(str::trim) {
            None | Some("") => Err(AppError::authentication("Missing user identifier")),
            Some(raw) => raw
                .parse::<UserId>()
                .map_err(|_| AppError::authentication("Malformed user identifier")),
        };
        if let Err(e) = &result {
            self.metrics.connection_rejected();
            warn!(error = %e, "Rejected realtime connection");
        }
        result
    }

    /// Register a new connection and queue its `connection_established` frame.
    ///
    /// Returns the handle and the receiver the socket writer drains.
    pub fn open(&self, user_id: UserId) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        self.registry.register(handle.clone());
        self.metrics.connection_opened();

        let ack = OutboundMessage::ConnectionEstablished {
            message: ESTABLISHED_MESSAGE.to_string(),
        };
        match serialize_outbound(&ack) {
            Ok(frame) => {
                handle.try_send(frame);
            }
            Err(e) => warn!(conn_id = %handle.id, error = %e, "Failed to encode acknowledgement"),
        }

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            connections = self.registry.connections_for(user_id).len(),
            "Realtime connection opened"
        );
        (handle, rx)
    }

    /// Process one inbound text frame from an open connection.
    ///
    /// Malformed frames and failed store calls are logged and contained;
    /// nothing here ends the connection.
    pub async fn handle_frame(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.frame_received();

        let parsed = validate_inbound(raw, self.config.max_frame_bytes)
            .and_then(|()| deserialize_inbound(raw).map_err(AppError::from));
        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                self.metrics.frame_malformed();
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    error = %e,
                    "Ignoring malformed frame"
                );
                return;
            }
        };

        let result = match msg {
            InboundMessage::MarkNotificationRead { notification_id } => {
                self.mark_read(handle.user_id, notification_id).await
            }
            InboundMessage::MarkAllRead => self.mark_all_read(handle.user_id).await.map(|_| ()),
        };

        if let Err(e) = result {
            match e.kind {
                ErrorKind::NotFound => {
                    debug!(conn_id = %handle.id, error = %e, "Read request for unknown notification")
                }
                _ => warn!(conn_id = %handle.id, error = %e, "Read request failed"),
            }
        }
    }

    /// Mark one notification read and tell all of the user's connections.
    pub async fn mark_read(&self, user_id: UserId, notification_id: NotificationId) -> AppResult<()> {
        self.store.mark_read(user_id, notification_id).await?;
        self.broadcast_state(user_id, &OutboundMessage::NotificationRead { notification_id });
        Ok(())
    }

    /// Mark all of a user's notifications read and tell all of their connections.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let changed = self.store.mark_all_read(user_id).await?;
        self.broadcast_state(user_id, &OutboundMessage::AllNotificationsRead);
        Ok(changed)
    }

    /// Terminal transition: drop the connection from the registry.
    pub fn close(&self, handle: &ConnectionHandle) {
        handle.mark_closed();
        if self.registry.unregister(handle.user_id, handle.id).is_some() {
            self.metrics.connection_closed();
        }
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "Realtime connection closed"
        );
    }

    fn broadcast_state(&self, user_id: UserId, msg: &OutboundMessage) {
        if let Err(e) = self.broadcaster.push_to_user(user_id, msg) {
            self.metrics.push_failed();
            warn!(user_id = %user_id, frame = msg.kind(), error = %e, "Read-state push failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use gigboard_database::MemoryNotificationStore;
    use gigboard_entity::notification::{NewNotification, NotificationType};

    use super::*;

    struct Harness {
        registry: Arc<ConnectionRegistry>,
        store: Arc<MemoryNotificationStore>,
        metrics: Arc<RealtimeMetrics>,
        gateway: RealtimeGateway,
    }

    fn harness() -> Harness {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = Arc::new(MemoryNotificationStore::new());
        let metrics = Arc::new(RealtimeMetrics::new());
        let broadcaster = Broadcaster::new(registry.clone(), metrics.clone());
        let gateway = RealtimeGateway::new(
            RealtimeConfig::default(),
            registry.clone(),
            broadcaster,
            store.clone(),
            metrics.clone(),
        );
        Harness {
            registry,
            store,
            metrics,
            gateway,
        }
    }

    async fn seed(store: &MemoryNotificationStore, user: UserId) -> NotificationId {
        store
            .create(NewNotification::new(
                user,
                NotificationType::NewMessage,
                "New message from Ana",
                "hello",
            ))
            .await
            .unwrap()
            .id
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[test]
    fn test_authorize_rejects_missing_or_malformed_ids() {
        let h = harness();
        assert!(h.gateway.authorize(None).is_err());
        assert!(h.gateway.authorize(Some("  ")).is_err());
        assert!(h.gateway.authorize(Some("not-a-uuid")).is_err());
        let user = UserId::new();
        assert_eq!(h.gateway.authorize(Some(&user.to_string())).unwrap(), user);
        assert_eq!(h.metrics.snapshot().connections_rejected, 3);
    }

    #[test]
    fn test_open_registers_then_acknowledges() {
        let h = harness();
        let user = UserId::new();

        let (handle, mut rx) = h.gateway.open(user);

        assert_eq!(h.registry.connections_for(user).len(), 1);
        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "connection_established");
        assert_eq!(frames[0]["message"], ESTABLISHED_MESSAGE);

        h.gateway.close(&handle);
        assert!(!h.registry.contains_user(user));
    }

    #[tokio::test]
    async fn test_mark_read_frame_broadcasts_to_sender() {
        let h = harness();
        let user = UserId::new();
        let id = seed(&h.store, user).await;
        let (handle, mut rx) = h.gateway.open(user);
        drain(&mut rx);

        let raw = format!(r#"{{"type":"mark_notification_read","notificationId":"{id}"}}"#);
        h.gateway.handle_frame(&handle, &raw).await;

        let frames = drain(&mut rx);
        assert_eq!(
            frames,
            vec![serde_json::json!({ "type": "notification_read", "notificationId": id.to_string() })]
        );
        assert_eq!(h.store.unread_count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read_reaches_every_tab() {
        let h = harness();
        let user = UserId::new();
        for _ in 0..3 {
            seed(&h.store, user).await;
        }
        let (first, mut rx1) = h.gateway.open(user);
        let (_second, mut rx2) = h.gateway.open(user);
        drain(&mut rx1);
        drain(&mut rx2);

        h.gateway
            .handle_frame(&first, r#"{"type":"mark_all_read"}"#)
            .await;

        let expected = vec![serde_json::json!({ "type": "all_notifications_read" })];
        assert_eq!(drain(&mut rx1), expected);
        assert_eq!(drain(&mut rx2), expected);
        assert_eq!(h.store.unread_count(user).await.unwrap(), 0);
        let listed = h.store.list(user, 50).await.unwrap();
        assert!(listed.iter().all(|n| n.is_read));
    }

    #[tokio::test]
    async fn test_malformed_frames_are_contained() {
        let h = harness();
        let user = UserId::new();
        let (handle, mut rx) = h.gateway.open(user);
        drain(&mut rx);

        for raw in ["not json", "", r#"{"type":"subscribe"}"#, r#"{"type":"mark_notification_read"}"#] {
            h.gateway.handle_frame(&handle, raw).await;
        }

        assert!(drain(&mut rx).is_empty());
        assert!(h.registry.contains_user(user));
        assert_eq!(h.metrics.snapshot().frames_malformed, 4);
    }

    #[tokio::test]
    async fn test_foreign_notification_is_not_broadcast() {
        let h = harness();
        let owner = UserId::new();
        let intruder = UserId::new();
        let id = seed(&h.store, owner).await;
        let (handle, mut rx) = h.gateway.open(intruder);
        drain(&mut rx);

        let raw = format!(r#"{{"type":"mark_notification_read","notificationId":"{id}"}}"#);
        h.gateway.handle_frame(&handle, &raw).await;

        assert!(drain(&mut rx).is_empty());
        assert_eq!(h.store.unread_count(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_mark_read_is_harmless() {
        let h = harness();
        let user = UserId::new();
        let id = seed(&h.store, user).await;

        h.gateway.mark_read(user, id).await.unwrap();
        let first = h.store.get(user, id).await.unwrap().unwrap().read_at;
        h.gateway.mark_read(user, id).await.unwrap();
        let second = h.store.get(user, id).await.unwrap().unwrap().read_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
