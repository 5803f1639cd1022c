//! Fan-out of one frame to every open connection of a user.

use std::sync::Arc;

use tracing::{debug, warn};

use gigboard_core::result::AppResult;
use gigboard_core::types::UserId;

use crate::connection::{ConnectionRegistry, SendOutcome};
use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

/// Best-effort push to live connections.
///
/// Nothing is buffered for users without a connection; they recover state
/// from the notification store when they next list or reconnect.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl Broadcaster {
    /// Create a broadcaster over a registry.
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Push a frame to every open connection of `user_id`.
    ///
    /// Returns how many connections accepted the frame. Connections whose
    /// transport turned out to be closed are removed from the registry.
    /// Only a serialization failure is reported as an error.
    pub fn push_to_user(&self, user_id: UserId, msg: &OutboundMessage) -> AppResult<usize> {
        let frame = serialize_outbound(msg)?;
        Ok(self.deliver(user_id, &frame, msg.kind()))
    }

    /// Push a frame to several users in turn. Returns total deliveries.
    pub fn push_to_users(&self, user_ids: &[UserId], msg: &OutboundMessage) -> AppResult<usize> {
        let frame = serialize_outbound(msg)?;
        Ok(user_ids
            .iter()
            .map(|user_id| self.deliver(*user_id, &frame, msg.kind()))
            .sum())
    }

    fn deliver(&self, user_id: UserId, frame: &str, kind: &'static str) -> usize {
        let connections = self.registry.connections_for(user_id);
        if connections.is_empty() {
            debug!(user_id = %user_id, frame = kind, "No open connections, push skipped");
            return 0;
        }

        let mut delivered = 0;
        for conn in connections {
            match conn.try_send(frame.to_owned()) {
                SendOutcome::Delivered => {
                    delivered += 1;
                    self.metrics.frame_sent();
                }
                SendOutcome::Dropped => self.metrics.frame_dropped(),
                SendOutcome::Closed => {
                    if self.registry.unregister(user_id, conn.id).is_some() {
                        self.metrics.connection_pruned();
                        warn!(
                            user_id = %user_id,
                            conn_id = %conn.id,
                            "Pruned connection with closed transport"
                        );
                    }
                }
            }
        }

        debug!(user_id = %user_id, frame = kind, delivered, "Frame pushed");
        delivered
    }
}
