//! Inbound and outbound WebSocket frame definitions.

use serde::{Deserialize, Serialize};

use gigboard_core::types::NotificationId;
use gigboard_entity::notification::Notification;

/// Control frames sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum InboundMessage {
    /// Mark one notification read.
    MarkNotificationRead {
        /// Notification ID.
        notification_id: NotificationId,
    },
    /// Mark every notification of the sender read.
    MarkAllRead,
}

/// Frames pushed by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum OutboundMessage {
    /// Liveness acknowledgement, sent once when a connection opens.
    ConnectionEstablished {
        /// Human-readable greeting.
        message: String,
    },
    /// A notification was persisted for this user.
    NewNotification {
        /// The stored record.
        notification: Box<Notification>,
    },
    /// A notification's read state changed.
    NotificationRead {
        /// Notification ID.
        notification_id: NotificationId,
    },
    /// Every notification for this user is now read.
    AllNotificationsRead,
}

impl OutboundMessage {
    /// Wrap a stored notification in a `new_notification` frame.
    pub fn new_notification(notification: Notification) -> Self {
        Self::NewNotification {
            notification: Box::new(notification),
        }
    }

    /// Frame type tag, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::NewNotification { .. } => "new_notification",
            Self::NotificationRead { .. } => "notification_read",
            Self::AllNotificationsRead => "all_notifications_read",
        }
    }
}
