//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use gigboard_core::types::NotificationId;
use gigboard_entity::notification::Notification;

use crate::dto::response::{ApiResponse, CountResponse, MarkedResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{CurrentUser, ListParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, ApiError> {
    let limit = params.resolve_limit(&state.config.store);
    let items = state.store.list(user_id, limit).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.store.unread_count(user_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.engine.gateway.mark_read(user_id, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Marked as read"))))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = state.engine.gateway.mark_all_read(user_id).await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.store.delete(user_id, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Deleted"))))
}
