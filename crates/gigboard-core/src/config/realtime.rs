//! Realtime (WebSocket) channel configuration.

use serde::{Deserialize, Serialize};

/// Realtime channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound frame buffer per connection.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Largest inbound frame accepted, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Route the WebSocket upgrade is served on.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
            ws_path: default_ws_path(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    65_536
}

fn default_ws_path() -> String {
    "/ws".to_string()
}
