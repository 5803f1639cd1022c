//! Integration tests for the client notification agent against a live server.

mod helpers;

use std::time::Duration;

use gigboard_client::{AgentHandle, AgentNotice, NotificationAgent};
use gigboard_core::types::UserId;

use helpers::{FRAME_TIMEOUT, TestApp};

async fn next_notice(agent: &mut AgentHandle) -> AgentNotice {
    tokio::time::timeout(FRAME_TIMEOUT, agent.next_notice())
        .await
        .expect("Timed out waiting for a notice")
        .expect("Agent stopped")
}

async fn connected_agent(app: &TestApp, base: &str, user: UserId) -> AgentHandle {
    let url = NotificationAgent::url_for(base, user);
    let mut agent = NotificationAgent::spawn(&app.config.client, url).expect("valid url");
    assert_eq!(next_notice(&mut agent).await, AgentNotice::Connected);
    app.wait_for_connections(1).await;
    agent
}

#[tokio::test]
async fn test_agent_alerts_on_new_notification() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut agent = connected_agent(&app, &base, user).await;

    app.publish_message(user, "Can you start Monday?").await;

    match next_notice(&mut agent).await {
        AgentNotice::Alert(n) => {
            assert_eq!(n.user_id, user);
            assert_eq!(n.message, "Can you start Monday?");
        }
        other => panic!("expected alert, got {other:?}"),
    }
    assert_eq!(next_notice(&mut agent).await, AgentNotice::Invalidate);

    let cache = agent.cache();
    {
        let cache = cache.read().await;
        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.unread_count(), 1);
    }

    agent.close().await;
}

#[tokio::test]
async fn test_agent_mark_all_read_round_trip() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let user = UserId::new();
    let mut agent = connected_agent(&app, &base, user).await;
    app.publish_message(user, "one").await;
    assert!(matches!(next_notice(&mut agent).await, AgentNotice::Alert(_)));
    assert_eq!(next_notice(&mut agent).await, AgentNotice::Invalidate);

    agent.mark_all_read().unwrap();

    assert_eq!(next_notice(&mut agent).await, AgentNotice::Invalidate);
    assert_eq!(app.store.unread_count(user).await.unwrap(), 0);
    agent.close().await;
}

#[tokio::test]
async fn test_logout_closes_cleanly_without_reconnect() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let mut agent = connected_agent(&app, &base, UserId::new()).await;

    agent.logout().unwrap();

    assert_eq!(next_notice(&mut agent).await, AgentNotice::Closed);
    app.wait_for_connections(0).await;
    let quiet = tokio::time::timeout(Duration::from_millis(300), agent.next_notice()).await;
    assert!(quiet.is_err(), "no reconnect after logout");
    assert_eq!(app.engine.metrics.snapshot().connections_opened, 1);

    agent.close().await;
}

#[tokio::test]
async fn test_rejected_identity_is_not_retried() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let mut agent =
        NotificationAgent::spawn(&app.config.client, format!("{base}?userId=nobody")).unwrap();

    assert_eq!(next_notice(&mut agent).await, AgentNotice::Connected);
    assert_eq!(next_notice(&mut agent).await, AgentNotice::Rejected);
    let quiet = tokio::time::timeout(Duration::from_millis(300), agent.next_notice()).await;
    assert!(quiet.is_err(), "no reconnect after policy close");
    assert_eq!(app.engine.metrics.snapshot().connections_rejected, 1);

    agent.close().await;
}

#[tokio::test]
async fn test_unreachable_server_backs_off_then_goes_offline() {
    let app = TestApp::new();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = NotificationAgent::url_for(&format!("ws://127.0.0.1:{port}/ws"), UserId::new());
    let mut agent = NotificationAgent::spawn(&app.config.client, url).unwrap();

    let mut delays = Vec::new();
    loop {
        match next_notice(&mut agent).await {
            AgentNotice::Reconnecting { attempt, delay } => {
                assert_eq!(attempt as usize, delays.len() + 1);
                delays.push(delay.as_millis() as u64);
            }
            AgentNotice::Offline => break,
            other => panic!("unexpected notice {other:?}"),
        }
    }

    assert_eq!(delays, vec![50, 100, 200]);
    agent.close().await;
}

/// Accepts TCP connections and holds them without ever answering the handshake.
async fn stalled_listener() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("ws://{addr}/ws")
}

#[tokio::test]
async fn test_stalled_handshake_times_out_and_backs_off() {
    let app = TestApp::new();
    let base = stalled_listener().await;
    let url = NotificationAgent::url_for(&base, UserId::new());
    let mut agent = NotificationAgent::spawn(&app.config.client, url).unwrap();

    let mut attempts = Vec::new();
    loop {
        match next_notice(&mut agent).await {
            AgentNotice::Reconnecting { attempt, .. } => attempts.push(attempt),
            AgentNotice::Offline => break,
            other => panic!("unexpected notice {other:?}"),
        }
    }

    assert_eq!(attempts, vec![1, 2, 3]);
    agent.close().await;
}

#[tokio::test]
async fn test_logout_during_stalled_handshake_closes() {
    let app = TestApp::new();
    let base = stalled_listener().await;
    let mut config = app.config.client.clone();
    config.connect_timeout_ms = 60_000;
    let url = NotificationAgent::url_for(&base, UserId::new());
    let mut agent = NotificationAgent::spawn(&config, url).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    agent.logout().unwrap();

    assert_eq!(next_notice(&mut agent).await, AgentNotice::Closed);
    let quiet = tokio::time::timeout(Duration::from_millis(300), agent.next_notice()).await;
    assert!(quiet.is_err(), "no reconnect after logout");
    agent.close().await;
}

#[tokio::test]
async fn test_dropping_handle_mid_handshake_stops_agent() {
    let app = TestApp::new();
    let base = stalled_listener().await;
    let mut config = app.config.client.clone();
    config.connect_timeout_ms = 60_000;
    let url = NotificationAgent::url_for(&base, UserId::new());
    let agent = NotificationAgent::spawn(&config, url).unwrap();
    let cache = agent.cache();

    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(agent);

    tokio::time::timeout(FRAME_TIMEOUT, async {
        while std::sync::Arc::strong_count(&cache) > 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("driver task should exit once the handle is dropped");
}

#[tokio::test]
async fn test_server_shutdown_triggers_reconnect() {
    let app = TestApp::new();
    let base = app.spawn().await;
    let mut agent = connected_agent(&app, &base, UserId::new()).await;

    app.engine.shutdown();

    match next_notice(&mut agent).await {
        AgentNotice::Reconnecting { attempt, delay } => {
            assert_eq!(attempt, 1);
            assert_eq!(delay, Duration::from_millis(50));
        }
        other => panic!("expected reconnect, got {other:?}"),
    }
    assert_eq!(next_notice(&mut agent).await, AgentNotice::Connected);
    app.wait_for_connections(1).await;

    agent.close().await;
}

#[test]
fn test_spawn_rejects_non_websocket_urls() {
    let config = gigboard_core::config::ReconnectConfig::default();
    assert!(NotificationAgent::spawn(&config, "http://localhost/ws").is_err());
}
