//! WebSocket upgrade handler and per-connection socket loop.

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use gigboard_core::types::UserId;

use crate::state::AppState;

/// Query parameters of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Caller identity; resolved by the gateway after the upgrade.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Option<String>,
}

/// GET /ws?userId={id}: WebSocket upgrade
///
/// The handshake always completes. An unidentified caller is then closed
/// with 1008 so the client can tell rejection apart from a network failure.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let max_frame = state.engine.config().max_frame_bytes;
    let ws = ws.max_message_size(max_frame).max_frame_size(max_frame);

    match state.engine.gateway.authorize(query.user_id.as_deref()) {
        Ok(user_id) => ws.on_upgrade(move |socket| run_connection(state, user_id, socket)),
        Err(e) => {
            let reason = e.message;
            ws.on_upgrade(move |socket| reject(socket, reason))
        }
    }
}

async fn reject(mut socket: WebSocket, reason: String) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send policy close");
    }
}

/// Drives one open connection until either side closes or the server shuts down.
async fn run_connection(state: AppState, user_id: UserId, socket: WebSocket) {
    let gateway = state.engine.gateway.clone();
    let (handle, mut outbound_rx) = gateway.open(user_id);
    let mut writer_shutdown = state.engine.shutdown_receiver();
    let mut reader_shutdown = state.engine.shutdown_receiver();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let conn_id = handle.id;
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { return };
                    if let Err(e) = ws_tx.send(Message::Text(frame.into())).await {
                        debug!(conn_id = %conn_id, error = %e, "Socket write failed");
                        return;
                    }
                }
                _ = writer_shutdown.recv() => {
                    let frame = CloseFrame {
                        code: close_code::AWAY,
                        reason: "Server shutting down".into(),
                    };
                    let _ = ws_tx.send(Message::Close(Some(frame))).await;
                    return;
                }
            }
        }
    });

    loop {
        let next = tokio::select! {
            next = ws_rx.next() => next,
            _ = reader_shutdown.recv() => break,
        };
        match next {
            Some(Ok(Message::Text(text))) => gateway.handle_frame(&handle, text.as_str()).await,
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(Message::Binary(_))) => {
                debug!(conn_id = %conn_id, "Ignoring binary frame");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    gateway.close(&handle);
    drop(handle);
    if let Err(e) = writer.await {
        warn!(conn_id = %conn_id, error = %e, "Socket writer task failed");
    }
}
