//! Input payload for creating a notification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gigboard_core::types::UserId;

use super::kind::{NotificationType, RelatedEntityType};

/// Everything the store needs to persist a notification.
///
/// The store assigns `id`, `created_at` and the initial unread state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<RelatedEntityType>,
    pub action_url: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewNotification {
    /// Start a notification with an empty metadata object and no back-reference.
    pub fn new(
        user_id: UserId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_entity_id: None,
            related_entity_type: None,
            action_url: None,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Point the notification back at the domain object that caused it.
    pub fn related(mut self, entity_type: RelatedEntityType, entity_id: Uuid) -> Self {
        self.related_entity_type = Some(entity_type);
        self.related_entity_id = Some(entity_id);
        self
    }

    /// Set the client-side navigation target.
    pub fn action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Replace the metadata bag.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
