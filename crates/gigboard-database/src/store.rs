//! Notification store trait.

use async_trait::async_trait;

use gigboard_core::result::AppResult;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_entity::notification::{NewNotification, Notification};

/// Durable persistence of notification records.
///
/// Implementations own identity, read state, and the metadata payload.
/// Every mutation is scoped to the owning user: an id that exists but
/// belongs to someone else is reported as not found.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new notification, assigning its id and creation time.
    async fn create(&self, data: NewNotification) -> AppResult<Notification>;

    /// Fetch a single notification owned by `user_id`.
    async fn get(&self, user_id: UserId, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Mark one notification read.
    ///
    /// Idempotent: an already-read notification keeps its original `read_at`.
    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> AppResult<()>;

    /// Mark every unread notification of a user read. Returns how many changed.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Hard-delete a notification.
    async fn delete(&self, user_id: UserId, id: NotificationId) -> AppResult<()>;

    /// List a user's notifications, newest first.
    async fn list(&self, user_id: UserId, limit: u32) -> AppResult<Vec<Notification>>;

    /// Count a user's unread notifications.
    async fn unread_count(&self, user_id: UserId) -> AppResult<u64>;

    /// Backend name for logs and health output.
    fn provider_name(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
