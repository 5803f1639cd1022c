//! In-process notification store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use gigboard_core::error::AppError;
use gigboard_core::result::AppResult;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_entity::notification::{NewNotification, Notification};

use crate::store::NotificationStore;

/// Notification store kept in a sharded concurrent map.
///
/// Each user's notifications are held in insertion order, so listing
/// newest-first is a reverse walk. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    by_user: DashMap<UserId, Vec<Notification>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total notifications held across all users.
    pub fn len(&self) -> usize {
        self.by_user.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether the store holds no notifications.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, data: NewNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: NotificationId::new(),
            user_id: data.user_id,
            kind: data.kind,
            title: data.title,
            message: data.message,
            related_entity_id: data.related_entity_id,
            related_entity_type: data.related_entity_type,
            action_url: data.action_url,
            metadata: data.metadata,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };

        self.by_user
            .entry(notification.user_id)
            .or_default()
            .push(notification.clone());

        debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification stored"
        );
        Ok(notification)
    }

    async fn get(&self, user_id: UserId, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self
            .by_user
            .get(&user_id)
            .and_then(|list| list.iter().find(|n| n.id == id).cloned()))
    }

    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> AppResult<()> {
        let mut list = self
            .by_user
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        let notification = list
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        notification.mark_read_at(Utc::now());
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let now = Utc::now();
        let changed = match self.by_user.get_mut(&user_id) {
            Some(mut list) => list
                .iter_mut()
                .map(|n| n.mark_read_at(now))
                .filter(|changed| *changed)
                .count() as u64,
            None => 0,
        };
        Ok(changed)
    }

    async fn delete(&self, user_id: UserId, id: NotificationId) -> AppResult<()> {
        let removed = match self.by_user.get_mut(&user_id) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|n| n.id != id);
                list.len() != before
            }
            None => false,
        };
        if !removed {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        self.by_user.remove_if(&user_id, |_, list| list.is_empty());
        Ok(())
    }

    async fn list(&self, user_id: UserId, limit: u32) -> AppResult<Vec<Notification>> {
        Ok(self
            .by_user
            .get(&user_id)
            .map(|list| list.iter().rev().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn unread_count(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .by_user
            .get(&user_id)
            .map(|list| list.iter().filter(|n| n.is_unread()).count() as u64)
            .unwrap_or(0))
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
