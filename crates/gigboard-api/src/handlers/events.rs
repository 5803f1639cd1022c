//! Domain-event ingestion from the marketplace CRUD layer.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use gigboard_core::error::AppError;
use gigboard_entity::notification::Notification;
use gigboard_realtime::notification::DomainEvent;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/events
///
/// Persists the event's notification and pushes it live. A store failure
/// becomes 503 so the caller can decide whether its own action proceeds.
pub async fn publish_event(
    State(state): State<AppState>,
    Json(event): Json<DomainEvent>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    let kind = event.kind();
    let notification = state
        .engine
        .notifications
        .dispatch(event)
        .await
        .map_err(|e| {
            if e.is_store_failure() {
                warn!(kind = %kind, error = %e, "Notification store unavailable");
                AppError::service_unavailable("Notification store unavailable")
            } else {
                e
            }
        })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}
