//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;
use uuid::Uuid;

use gigboard_api::{AppState, build_router};
use gigboard_core::config::AppConfig;
use gigboard_core::error::AppError;
use gigboard_core::result::AppResult;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_database::{MemoryNotificationStore, NotificationStore};
use gigboard_entity::notification::{NewNotification, Notification};
use gigboard_realtime::RealtimeEngine;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a test waits for an expected frame.
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Notification store behind the router
    pub store: Arc<dyn NotificationStore>,
    /// Realtime engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl TestApp {
    /// Create a new test application over an in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryNotificationStore::new()))
    }

    /// Create a test application over a specific store
    pub fn with_store(store: Arc<dyn NotificationStore>) -> Self {
        let mut config = AppConfig::default();
        config.client.base_delay_ms = 50;
        config.client.max_delay_ms = 400;
        config.client.max_attempts = 3;
        config.client.connect_timeout_ms = 200;
        let config = Arc::new(config);

        let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), store.clone()));
        let router = build_router(AppState::new(config.clone(), store.clone(), engine.clone()));

        Self {
            router,
            store,
            engine,
            config,
        }
    }

    /// Serve the router on an ephemeral local port and return the ws URL base.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });
        format!("ws://{addr}{}", self.config.realtime.ws_path)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("x-user-id", user.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Publish a `new_message` event for `recipient` through the HTTP API.
    pub async fn publish_message(&self, recipient: UserId, preview: &str) -> TestResponse {
        self.request("POST", "/api/events", Some(message_event(recipient, preview)), None)
            .await
    }

    /// Wait until the registry holds `expected` connections.
    pub async fn wait_for_connections(&self, expected: usize) {
        let registry = self.engine.registry.clone();
        tokio::time::timeout(FRAME_TIMEOUT, async move {
            while registry.connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {expected} connections"));
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A `new_message` domain event as the CRUD layer would post it.
pub fn message_event(recipient: UserId, preview: &str) -> Value {
    serde_json::json!({
        "event": "new_message",
        "recipientId": recipient,
        "senderId": UserId::new(),
        "senderName": "Ana",
        "messageId": Uuid::new_v4(),
        "preview": preview,
    })
}

/// Open a realtime connection as `user` and consume the acknowledgement.
pub async fn connect_user(base: &str, user: UserId) -> WsClient {
    let (mut ws, _) = connect_async(format!("{base}?userId={user}"))
        .await
        .expect("WebSocket handshake failed");
    let ack = next_json(&mut ws).await;
    assert_eq!(ack["type"], "connection_established");
    ws
}

/// Next text frame as JSON, skipping control frames.
pub async fn next_json(ws: &mut WsClient) -> Value {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Stream ended")
            .expect("Transport error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
            Message::Close(frame) => panic!("Unexpected close: {frame:?}"),
            _ => continue,
        }
    }
}

/// Assert that no text frame arrives within `window`.
pub async fn expect_silence(ws: &mut WsClient, window: Duration) {
    match tokio::time::timeout(window, ws.next()).await {
        Err(_) => {}
        Ok(Some(Ok(Message::Text(text)))) => panic!("Unexpected frame: {}", text.as_str()),
        Ok(other) => panic!("Unexpected socket event: {other:?}"),
    }
}

/// Store that fails every call, standing in for an unavailable database.
#[derive(Debug)]
pub struct UnavailableStore;

#[async_trait]
impl NotificationStore for UnavailableStore {
    async fn create(&self, _data: NewNotification) -> AppResult<Notification> {
        Err(AppError::database("connection refused"))
    }

    async fn get(&self, _user_id: UserId, _id: NotificationId) -> AppResult<Option<Notification>> {
        Err(AppError::database("connection refused"))
    }

    async fn mark_read(&self, _user_id: UserId, _id: NotificationId) -> AppResult<()> {
        Err(AppError::database("connection refused"))
    }

    async fn mark_all_read(&self, _user_id: UserId) -> AppResult<u64> {
        Err(AppError::database("connection refused"))
    }

    async fn delete(&self, _user_id: UserId, _id: NotificationId) -> AppResult<()> {
        Err(AppError::database("connection refused"))
    }

    async fn list(&self, _user_id: UserId, _limit: u32) -> AppResult<Vec<Notification>> {
        Err(AppError::database("connection refused"))
    }

    async fn unread_count(&self, _user_id: UserId) -> AppResult<u64> {
        Err(AppError::database("connection refused"))
    }

    fn provider_name(&self) -> &'static str {
        "unavailable"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}
