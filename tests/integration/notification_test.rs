//! Integration tests for the notification REST endpoints and event ingestion.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use uuid::Uuid;

use gigboard_core::types::UserId;

use helpers::{TestApp, UnavailableStore, message_event};

#[tokio::test]
async fn test_requests_without_identity_are_unauthorized() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/notifications", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "UNAUTHORIZED");

    let response = app
        .request("PUT", "/api/notifications/read-all", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let app = TestApp::new();
    let user = UserId::new();
    for i in 0..5 {
        app.publish_message(user, &format!("message {i}")).await;
    }

    let all = app.request("GET", "/api/notifications", None, Some(user)).await;
    assert_eq!(all.status, StatusCode::OK);
    let items = all.body["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["message"], "message 4");
    assert_eq!(items[4]["message"], "message 0");

    let limited = app
        .request("GET", "/api/notifications?limit=2", None, Some(user))
        .await;
    let items = limited.body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "message 4");
}

#[tokio::test]
async fn test_mark_read_is_idempotent_and_owner_scoped() {
    let app = TestApp::new();
    let owner = UserId::new();
    let other = UserId::new();
    let id = app.publish_message(owner, "hi").await.body["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = format!("/api/notifications/{id}/read");

    let foreign = app.request("PUT", &path, None, Some(other)).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let first = app.request("PUT", &path, None, Some(owner)).await;
    assert_eq!(first.status, StatusCode::OK);
    let listed = app.request("GET", "/api/notifications", None, Some(owner)).await;
    let read_at = listed.body["data"][0]["readAt"].clone();
    assert!(read_at.is_string());

    let second = app.request("PUT", &path, None, Some(owner)).await;
    assert_eq!(second.status, StatusCode::OK);
    let listed = app.request("GET", "/api/notifications", None, Some(owner)).await;
    assert_eq!(listed.body["data"][0]["readAt"], read_at);
    assert_eq!(listed.body["data"][0]["isRead"], true);
}

#[tokio::test]
async fn test_read_all_reports_changed_count() {
    let app = TestApp::new();
    let user = UserId::new();
    for _ in 0..3 {
        app.publish_message(user, "ping").await;
    }

    let unread = app
        .request("GET", "/api/notifications/unread-count", None, Some(user))
        .await;
    assert_eq!(unread.body["data"]["count"], 3);

    let marked = app
        .request("PUT", "/api/notifications/read-all", None, Some(user))
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.body["data"]["marked"], 3);

    let again = app
        .request("PUT", "/api/notifications/read-all", None, Some(user))
        .await;
    assert_eq!(again.body["data"]["marked"], 0);
}

#[tokio::test]
async fn test_delete_removes_notification() {
    let app = TestApp::new();
    let user = UserId::new();
    let id = app.publish_message(user, "bye").await.body["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let path = format!("/api/notifications/{id}");

    let deleted = app.request("DELETE", &path, None, Some(user)).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let listed = app.request("GET", "/api/notifications", None, Some(user)).await;
    assert!(listed.body["data"].as_array().unwrap().is_empty());

    let missing = app.request("DELETE", &path, None, Some(user)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_formats_notification() {
    let app = TestApp::new();
    let owner = UserId::new();
    let task_id = Uuid::new_v4();
    let event = serde_json::json!({
        "event": "new_bid",
        "taskOwnerId": owner,
        "taskId": task_id,
        "taskTitle": "Logo design",
        "bidId": Uuid::new_v4(),
        "bidderId": UserId::new(),
        "bidderName": "Ana",
        "amountCents": 12500,
    });

    let response = app.request("POST", "/api/events", Some(event), None).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let notification = &response.body["data"];
    assert_eq!(notification["type"], "new_bid");
    assert_eq!(notification["title"], "New Bid Received");
    assert_eq!(notification["userId"], owner.to_string());
    assert_eq!(notification["relatedEntityType"], "bid");
    assert_eq!(notification["actionUrl"], format!("/tasks/{task_id}"));
}

#[tokio::test]
async fn test_invalid_event_is_rejected_and_not_stored() {
    let app = TestApp::new();
    let user = UserId::new();
    let mut event = message_event(user, "hello");
    event["senderName"] = serde_json::json!("");

    let response = app.request("POST", "/api/events", Some(event), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let listed = app.request("GET", "/api/notifications", None, Some(user)).await;
    assert!(listed.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_reports_unavailable() {
    let app = TestApp::with_store(Arc::new(UnavailableStore));
    let user = UserId::new();

    let response = app.publish_message(user, "hello").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.engine.metrics.snapshot().notifications_published, 0);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let basic = app.request("GET", "/api/health", None, None).await;
    assert_eq!(basic.status, StatusCode::OK);
    assert_eq!(basic.body["data"]["status"], "ok");

    let detailed = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.body["data"]["store"], "memory");
    assert_eq!(detailed.body["data"]["wsConnections"], 0);
    assert!(detailed.body["data"]["realtime"].is_object());

    let degraded = TestApp::with_store(Arc::new(UnavailableStore))
        .request("GET", "/api/health/detailed", None, None)
        .await;
    assert_eq!(degraded.body["data"]["status"], "degraded");
}
