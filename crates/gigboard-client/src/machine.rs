//! Reconnection state machine.
//!
//! Pure and synchronous: it consumes [`AgentEvent`]s and returns the
//! [`AgentAction`]s the driver must perform. All reconnect rules live in
//! [`ReconnectMachine::handle`], so they can be tested without sockets.

use std::time::Duration;

use tracing::{debug, info, warn};

use gigboard_entity::notification::Notification;
use gigboard_realtime::message::types::OutboundMessage;

use crate::backoff::BackoffPolicy;

/// WebSocket close code for a normal, intentional closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// WebSocket close code the server uses to reject an unidentified caller.
pub const CLOSE_POLICY: u16 = 1008;

/// Transport state of the agent's single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Start the session's connection.
    Connect,
    /// Explicit user retry after going offline; resets the attempt count.
    Retry,
    /// The handshake completed.
    Opened,
    /// The transport closed. `None` means no close frame was received.
    Closed { code: Option<u16> },
    /// A connect attempt failed before opening.
    ConnectFailed,
    /// The pending reconnect timer elapsed.
    TimerFired,
    /// A frame was pushed by the server.
    Frame(OutboundMessage),
    /// The session ended; close cleanly and never reconnect.
    Logout,
    /// The consumer is gone; close cleanly and stop the driver.
    Teardown,
}

/// Outputs the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    /// Start a WebSocket handshake.
    OpenSocket,
    /// Arm the single reconnect timer.
    ScheduleReconnect { delay: Duration, attempt: u32 },
    /// Disarm the reconnect timer.
    CancelTimer,
    /// Send a normal (1000) close frame.
    CloseSocket,
    /// Tell the consumer something.
    Notify(AgentNotice),
    /// Exit the driver.
    Stop,
}

/// What the consumer sees.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentNotice {
    /// The connection is open.
    Connected,
    /// A new notification arrived; show a transient alert.
    Alert(Box<Notification>),
    /// Cached list and unread count are out of date.
    Invalidate,
    /// Connection lost; a reconnect is scheduled.
    Reconnecting { attempt: u32, delay: Duration },
    /// Reconnects are exhausted; show a persistent offline indicator.
    Offline,
    /// The server rejected the caller's identity; re-authentication is required.
    Rejected,
    /// The connection closed cleanly and will not be reopened.
    Closed,
}

/// Reconnection state for one signed-in session.
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    policy: BackoffPolicy,
    state: ConnectionState,
    attempt_count: u32,
    timer_pending: bool,
    authenticated: bool,
    offline: bool,
}

impl ReconnectMachine {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            attempt_count: 0,
            timer_pending: false,
            authenticated: false,
            offline: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn timer_pending(&self) -> bool {
        self.timer_pending
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Apply one event and return the resulting actions.
    pub fn handle(&mut self, event: AgentEvent) -> Vec<AgentAction> {
        use ConnectionState::*;

        match (self.state, event) {
            (Disconnected, AgentEvent::Connect) if !self.timer_pending => {
                self.authenticated = true;
                self.attempt_count = 0;
                self.offline = false;
                self.state = Connecting;
                vec![AgentAction::OpenSocket]
            }

            (Disconnected, AgentEvent::Retry) if self.authenticated => {
                self.attempt_count = 0;
                self.offline = false;
                self.state = Connecting;
                let mut actions = self.cancel_timer();
                actions.push(AgentAction::OpenSocket);
                actions
            }

            (Connecting, AgentEvent::Opened) => {
                self.state = Connected;
                self.attempt_count = 0;
                self.offline = false;
                info!("Notification channel connected");
                let mut actions = self.cancel_timer();
                actions.push(AgentAction::Notify(AgentNotice::Connected));
                actions
            }

            (Connecting | Connected, AgentEvent::Closed { code }) => self.on_closed(code),
            (Connecting, AgentEvent::ConnectFailed) => self.on_closed(None),

            (Disconnected, AgentEvent::TimerFired) if self.timer_pending => {
                self.timer_pending = false;
                if !self.authenticated {
                    return Vec::new();
                }
                self.state = Connecting;
                vec![AgentAction::OpenSocket]
            }

            (Connected, AgentEvent::Frame(msg)) => Self::on_frame(msg),

            (_, AgentEvent::Logout) => self.end_session(),

            (_, AgentEvent::Teardown) => {
                let mut actions = self.end_session();
                actions.push(AgentAction::Stop);
                actions
            }

            (state, event) => {
                debug!(?state, ?event, "Ignoring agent event");
                Vec::new()
            }
        }
    }

    fn on_closed(&mut self, code: Option<u16>) -> Vec<AgentAction> {
        self.state = ConnectionState::Disconnected;

        match code {
            Some(CLOSE_NORMAL) => {
                info!("Notification channel closed cleanly");
                vec![AgentAction::Notify(AgentNotice::Closed)]
            }
            Some(CLOSE_POLICY) => {
                warn!("Notification channel rejected the session identity");
                self.authenticated = false;
                vec![AgentAction::Notify(AgentNotice::Rejected)]
            }
            _ if !self.authenticated => Vec::new(),
            _ if self.policy.allows(self.attempt_count) => {
                let delay = self.policy.delay_for(self.attempt_count);
                self.attempt_count += 1;
                self.timer_pending = true;
                warn!(
                    attempt = self.attempt_count,
                    delay_ms = delay.as_millis() as u64,
                    ?code,
                    "Notification channel lost, scheduling reconnect"
                );
                vec![
                    AgentAction::ScheduleReconnect {
                        delay,
                        attempt: self.attempt_count,
                    },
                    AgentAction::Notify(AgentNotice::Reconnecting {
                        attempt: self.attempt_count,
                        delay,
                    }),
                ]
            }
            _ => {
                warn!(
                    attempts = self.attempt_count,
                    "Reconnect attempts exhausted, going offline"
                );
                self.offline = true;
                vec![AgentAction::Notify(AgentNotice::Offline)]
            }
        }
    }

    fn on_frame(msg: OutboundMessage) -> Vec<AgentAction> {
        match msg {
            OutboundMessage::NewNotification { notification } => vec![
                AgentAction::Notify(AgentNotice::Alert(notification)),
                AgentAction::Notify(AgentNotice::Invalidate),
            ],
            OutboundMessage::NotificationRead { .. } | OutboundMessage::AllNotificationsRead => {
                vec![AgentAction::Notify(AgentNotice::Invalidate)]
            }
            OutboundMessage::ConnectionEstablished { .. } => Vec::new(),
        }
    }

    fn end_session(&mut self) -> Vec<AgentAction> {
        self.authenticated = false;
        self.attempt_count = 0;
        self.offline = false;
        let mut actions = self.cancel_timer();
        if self.state != ConnectionState::Disconnected {
            actions.push(AgentAction::CloseSocket);
            actions.push(AgentAction::Notify(AgentNotice::Closed));
        }
        self.state = ConnectionState::Disconnected;
        actions
    }

    fn cancel_timer(&mut self) -> Vec<AgentAction> {
        if std::mem::take(&mut self.timer_pending) {
            vec![AgentAction::CancelTimer]
        } else {
            Vec::new()
        }
    }
}
