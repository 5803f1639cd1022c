//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gigboard_core::types::{NotificationId, UserId};

use super::kind::{NotificationType, RelatedEntityType};

/// A persisted notification for one user.
///
/// Everything except `is_read`/`read_at` is fixed at creation. The read
/// state only ever moves from unread to read, and `read_at` is stamped once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Event type that produced this notification.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Domain object this notification refers to.
    pub related_entity_id: Option<Uuid>,
    /// Kind of the referenced domain object.
    pub related_entity_type: Option<RelatedEntityType>,
    /// Client-side navigation target.
    pub action_url: Option<String>,
    /// Free-form structured data.
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Flip the read state, keeping the first `read_at` if already read.
    ///
    /// Returns `true` when this call changed the state.
    pub fn mark_read_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        true
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
