//! Client agent errors.

use thiserror::Error;

/// Errors surfaced by the notification agent.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint is not a `ws://` or `wss://` URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The agent task has stopped and no longer accepts commands.
    #[error("notification agent is closed")]
    Closed,

    /// WebSocket transport failure.
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame encoding failure.
    #[error("frame encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
