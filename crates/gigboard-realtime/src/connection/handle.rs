//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use gigboard_core::types::{ConnectionId, UserId};

/// Result of a non-blocking send to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was queued for the socket writer.
    Delivered,
    /// The outbound buffer was full and the frame was discarded.
    Dropped,
    /// The transport is gone; the connection should be pruned.
    Closed,
}

/// A handle to a single open WebSocket connection.
///
/// The handle owns the sending half of the connection's outbound queue.
/// The socket writer task owns the receiving half and forwards each
/// queued frame to the transport.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a serialized frame without waiting on the socket.
    pub fn try_send(&self, frame: String) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(frame) {
            Ok(()) => SendOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Connection send buffer full, dropping frame");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                SendOutcome::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    /// Mark connection as closed
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
