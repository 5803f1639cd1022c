//! Integration tests for the realtime channel over real WebSocket sessions.

mod helpers;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use axum::http::StatusCode;
use gigboard_core::types::UserId;

use helpers::{FRAME_TIMEOUT, TestApp, connect_user, expect_silence, next_json};

#[tokio::test]
async fn test_every_tab_receives_new_notification() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut tab1 = connect_user(&base, user).await;
    let mut tab2 = connect_user(&base, user).await;

    let response = app.publish_message(user, "Are you free tomorrow?").await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["data"]["id"].clone();

    for tab in [&mut tab1, &mut tab2] {
        let frame = next_json(tab).await;
        assert_eq!(frame["type"], "new_notification");
        assert_eq!(frame["notification"]["id"], id);
        assert_eq!(frame["notification"]["type"], "new_message");
        assert_eq!(frame["notification"]["isRead"], false);
    }

    let listed = app.request("GET", "/api/notifications", None, Some(user)).await;
    assert_eq!(listed.body["data"][0]["id"], id);
    assert_eq!(listed.body["data"][0]["isRead"], false);
}

#[tokio::test]
async fn test_mark_read_frame_converges_all_tabs() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut tab1 = connect_user(&base, user).await;
    let mut tab2 = connect_user(&base, user).await;

    let id = app.publish_message(user, "hi").await.body["data"]["id"].clone();
    next_json(&mut tab1).await;
    next_json(&mut tab2).await;

    let frame = serde_json::json!({ "type": "mark_notification_read", "notificationId": id });
    tab1.send(Message::Text(frame.to_string().into())).await.unwrap();

    for tab in [&mut tab1, &mut tab2] {
        let frame = next_json(tab).await;
        assert_eq!(frame["type"], "notification_read");
        assert_eq!(frame["notificationId"], id);
    }

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(user))
        .await;
    assert_eq!(count.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_offline_user_finds_notification_on_next_list() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();

    let response = app.publish_message(user, "sent while away").await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["data"]["id"].clone();

    // Missed pushes are not replayed on connect.
    let mut ws = connect_user(&base, user).await;
    expect_silence(&mut ws, Duration::from_millis(200)).await;

    let listed = app.request("GET", "/api/notifications", None, Some(user)).await;
    assert_eq!(listed.body["data"][0]["id"], id);
    assert_eq!(listed.body["data"][0]["isRead"], false);
}

#[tokio::test]
async fn test_mark_all_read_reaches_every_tab() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    for i in 0..3 {
        app.publish_message(user, &format!("message {i}")).await;
    }
    let mut tab1 = connect_user(&base, user).await;
    let mut tab2 = connect_user(&base, user).await;

    tab1.send(Message::Text(r#"{"type":"mark_all_read"}"#.into()))
        .await
        .unwrap();

    for tab in [&mut tab1, &mut tab2] {
        assert_eq!(next_json(tab).await["type"], "all_notifications_read");
    }
    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(user))
        .await;
    assert_eq!(count.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_pushes_are_scoped_to_the_recipient() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let alice = UserId::new();
    let bob = UserId::new();
    let mut alice_ws = connect_user(&base, alice).await;
    let mut bob_ws = connect_user(&base, bob).await;

    app.publish_message(alice, "for alice").await;

    assert_eq!(next_json(&mut alice_ws).await["type"], "new_notification");
    expect_silence(&mut bob_ws, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_missing_user_is_closed_with_policy_violation() {
    let app = TestApp::new();
    let base = app.spawn().await;

    for url in [base.clone(), format!("{base}?userId=not-a-uuid")] {
        let (mut ws, _) = connect_async(url).await.expect("handshake completes");
        let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("close frame arrives")
            .expect("stream open")
            .expect("no transport error");
        match msg {
            Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Policy),
            other => panic!("expected policy close, got {other:?}"),
        }
    }

    assert_eq!(app.engine.registry.connection_count(), 0);
    assert_eq!(app.engine.metrics.snapshot().connections_rejected, 2);
}

#[tokio::test]
async fn test_malformed_frames_keep_the_connection_open() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut ws = connect_user(&base, user).await;

    for raw in ["not json", r#"{"type":"subscribe"}"#, r#"{"type":"mark_notification_read"}"#] {
        ws.send(Message::Text(raw.into())).await.unwrap();
    }
    ws.send(Message::Text(r#"{"type":"mark_all_read"}"#.into()))
        .await
        .unwrap();

    assert_eq!(next_json(&mut ws).await["type"], "all_notifications_read");
    assert_eq!(app.engine.metrics.snapshot().frames_malformed, 3);
}

#[tokio::test]
async fn test_closed_connections_leave_the_registry() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut tab1 = connect_user(&base, user).await;
    let mut tab2 = connect_user(&base, user).await;
    app.wait_for_connections(2).await;

    tab1.close(None).await.unwrap();
    app.wait_for_connections(1).await;
    assert!(app.engine.registry.contains_user(user));

    tab2.close(None).await.unwrap();
    app.wait_for_connections(0).await;
    assert!(!app.engine.registry.contains_user(user));
    assert_eq!(app.engine.registry.user_count(), 0);
}

#[tokio::test]
async fn test_engine_shutdown_closes_open_sockets() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let mut ws = connect_user(&base, UserId::new()).await;

    app.engine.shutdown();

    let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
        .await
        .expect("close frame arrives")
        .expect("stream open")
        .expect("no transport error");
    match msg {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Away),
        other => panic!("expected going-away close, got {other:?}"),
    }
    assert_eq!(app.engine.registry.connection_count(), 0);
}
