//! PostgreSQL notification store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gigboard_core::error::{AppError, ErrorKind};
use gigboard_core::result::AppResult;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_entity::notification::{
    NewNotification, Notification, NotificationType, RelatedEntityType,
};

use crate::store::NotificationStore;

const COLUMNS: &str = "id, user_id, notification_type, title, message, related_entity_id, \
     related_entity_type, action_url, metadata, is_read, read_at, created_at";

/// Row shape of the `notifications` table.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    notification_type: String,
    title: String,
    message: String,
    related_entity_id: Option<Uuid>,
    related_entity_type: Option<String>,
    action_url: Option<String>,
    metadata: serde_json::Value,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = row
            .notification_type
            .parse::<NotificationType>()
            .map_err(|e: String| AppError::new(ErrorKind::Database, e))?;
        let related_entity_type = row
            .related_entity_type
            .as_deref()
            .map(str::parse::<RelatedEntityType>)
            .transpose()
            .map_err(|e: String| AppError::new(ErrorKind::Database, e))?;

        Ok(Notification {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind,
            title: row.title,
            message: row.message,
            related_entity_id: row.related_entity_id,
            related_entity_type,
            action_url: row.action_url,
            metadata: row.metadata,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

/// Notification store backed by the `notifications` table.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new notification store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, data: NewNotification) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "INSERT INTO notifications (id, user_id, notification_type, title, message, \
             related_entity_id, related_entity_type, action_url, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {COLUMNS}"
        ))
        .bind(NotificationId::new().into_uuid())
        .bind(data.user_id.into_uuid())
        .bind(data.kind.as_str())
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.related_entity_id)
        .bind(data.related_entity_type.map(|t| t.as_str()))
        .bind(&data.action_url)
        .bind(&data.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))?;

        row.try_into()
    }

    async fn get(&self, user_id: UserId, id: NotificationId) -> AppResult<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to get notification", e))?;

        row.map(Notification::try_from).transpose()
    }

    async fn mark_read(&self, user_id: UserId, id: NotificationId) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: UserId, id: NotificationId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id.into_uuid())
            .bind(user_id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        Ok(())
    }

    async fn list(&self, user_id: UserId, limit: u32) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(user_id.into_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn unread_count(&self, user_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id.into_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count.max(0) as u64)
    }

    fn provider_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
