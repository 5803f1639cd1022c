//! Notification agent: drives the reconnect machine over a real WebSocket.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gigboard_core::config::ReconnectConfig;
use gigboard_core::types::{NotificationId, UserId};
use gigboard_realtime::message::types::{InboundMessage, OutboundMessage};

use crate::backoff::BackoffPolicy;
use crate::cache::NotificationCache;
use crate::error::ClientError;
use crate::machine::{AgentAction, AgentEvent, AgentNotice, ReconnectMachine};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Requests from the handle to the driver task.
#[derive(Debug)]
enum Command {
    Send(InboundMessage),
    Retry,
    Logout,
}

/// What woke the driver loop.
enum Wake {
    Cancelled,
    Command(Option<Command>),
    Timer,
    Socket(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

/// Entry point for starting an agent.
pub struct NotificationAgent;

impl NotificationAgent {
    /// Build the channel URL for a user: `{base}?userId={user_id}`.
    pub fn url_for(base: &str, user_id: UserId) -> String {
        let sep = if base.contains('?') { '&' } else { '?' };
        format!("{base}{sep}userId={user_id}")
    }

    /// Spawn the driver task and connect immediately.
    pub fn spawn(config: &ReconnectConfig, url: impl Into<String>) -> Result<AgentHandle, ClientError> {
        let url = url.into();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::InvalidUrl(url));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let cache = Arc::new(RwLock::new(NotificationCache::new()));
        let cancel = CancellationToken::new();

        let driver = Driver {
            url,
            connect_timeout: config.connect_timeout(),
            machine: ReconnectMachine::new(BackoffPolicy::from(config)),
            socket: None,
            timer: None,
            commands: command_rx,
            notices: notice_tx,
            cache: cache.clone(),
            cancel: cancel.clone(),
            stopped: false,
        };
        let task = tokio::spawn(driver.run());

        Ok(AgentHandle {
            commands: command_tx,
            notices: notice_rx,
            cache,
            cancel,
            task: Some(task),
        })
    }
}

/// Consumer-side handle to a running agent.
///
/// Dropping the handle tears the agent down the same way [`AgentHandle::close`] does.
#[derive(Debug)]
pub struct AgentHandle {
    commands: mpsc::UnboundedSender<Command>,
    notices: mpsc::UnboundedReceiver<AgentNotice>,
    cache: Arc<RwLock<NotificationCache>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AgentHandle {
    /// Ask the server to mark one notification read.
    pub fn mark_read(&self, notification_id: NotificationId) -> Result<(), ClientError> {
        self.send(Command::Send(InboundMessage::MarkNotificationRead { notification_id }))
    }

    /// Ask the server to mark every notification read.
    pub fn mark_all_read(&self) -> Result<(), ClientError> {
        self.send(Command::Send(InboundMessage::MarkAllRead))
    }

    /// Explicit user retry after the agent went offline.
    pub fn retry(&self) -> Result<(), ClientError> {
        self.send(Command::Retry)
    }

    /// End the session: close cleanly and never reconnect.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.send(Command::Logout)
    }

    /// Wait for the next notice. `None` once the agent has stopped.
    pub async fn next_notice(&mut self) -> Option<AgentNotice> {
        self.notices.recv().await
    }

    /// Shared view of the local notification cache.
    pub fn cache(&self) -> Arc<RwLock<NotificationCache>> {
        self.cache.clone()
    }

    /// Stop the agent, cancelling any pending reconnect, and wait for it to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Notification agent task failed");
            }
        }
    }

    fn send(&self, command: Command) -> Result<(), ClientError> {
        self.commands.send(command).map_err(|_| ClientError::Closed)
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Driver {
    url: String,
    connect_timeout: Duration,
    machine: ReconnectMachine,
    socket: Option<WsStream>,
    timer: Option<Pin<Box<Sleep>>>,
    commands: mpsc::UnboundedReceiver<Command>,
    notices: mpsc::UnboundedSender<AgentNotice>,
    cache: Arc<RwLock<NotificationCache>>,
    cancel: CancellationToken,
    stopped: bool,
}

impl Driver {
    async fn run(mut self) {
        let mut pending = VecDeque::from([AgentEvent::Connect]);

        loop {
            while let Some(event) = pending.pop_front() {
                for action in self.machine.handle(event) {
                    if let Some(next) = self.perform(action).await {
                        pending.push_back(next);
                    }
                }
                if self.stopped {
                    return;
                }
            }

            let wake = tokio::select! {
                _ = self.cancel.cancelled() => Wake::Cancelled,
                cmd = self.commands.recv() => Wake::Command(cmd),
                _ = wait_timer(&mut self.timer) => Wake::Timer,
                msg = next_message(&mut self.socket) => Wake::Socket(msg),
            };

            if let Some(event) = self.on_wake(wake).await {
                pending.push_back(event);
            }
        }
    }

    async fn on_wake(&mut self, wake: Wake) -> Option<AgentEvent> {
        match wake {
            Wake::Cancelled | Wake::Command(None) => Some(AgentEvent::Teardown),
            Wake::Command(Some(Command::Retry)) => Some(AgentEvent::Retry),
            Wake::Command(Some(Command::Logout)) => Some(AgentEvent::Logout),
            Wake::Command(Some(Command::Send(msg))) => {
                self.send_frame(&msg).await;
                None
            }
            Wake::Timer => {
                self.timer = None;
                Some(AgentEvent::TimerFired)
            }
            Wake::Socket(Some(Ok(Message::Text(text)))) => {
                match serde_json::from_str::<OutboundMessage>(text.as_str()) {
                    Ok(msg) => Some(AgentEvent::Frame(msg)),
                    Err(e) => {
                        warn!(error = %e, "Ignoring unrecognized server frame");
                        None
                    }
                }
            }
            Wake::Socket(Some(Ok(Message::Close(frame)))) => {
                self.socket = None;
                Some(AgentEvent::Closed {
                    code: frame.map(|f| u16::from(f.code)),
                })
            }
            Wake::Socket(Some(Ok(_))) => None,
            Wake::Socket(Some(Err(e))) => {
                debug!(error = %e, "Notification channel transport error");
                self.socket = None;
                Some(AgentEvent::Closed { code: None })
            }
            Wake::Socket(None) => {
                self.socket = None;
                Some(AgentEvent::Closed { code: None })
            }
        }
    }

    /// Carry out one action. Returns a follow-up event for the machine, if any.
    async fn perform(&mut self, action: AgentAction) -> Option<AgentEvent> {
        match action {
            AgentAction::OpenSocket => self.open_socket().await,
            AgentAction::ScheduleReconnect { delay, attempt } => {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
                self.timer = Some(Box::pin(tokio::time::sleep(delay)));
                None
            }
            AgentAction::CancelTimer => {
                self.timer = None;
                None
            }
            AgentAction::CloseSocket => {
                if let Some(mut socket) = self.socket.take() {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "session ended".into(),
                    };
                    if let Err(e) = socket.close(Some(frame)).await {
                        debug!(error = %e, "Close handshake failed");
                    }
                }
                None
            }
            AgentAction::Notify(notice) => {
                self.cache.write().await.apply(&notice);
                let _ = self.notices.send(notice);
                None
            }
            AgentAction::Stop => {
                info!("Notification agent stopped");
                self.stopped = true;
                self.timer = None;
                None
            }
        }
    }

    /// Connect within the configured timeout. A logout or teardown that
    /// arrives mid-handshake abandons the attempt.
    async fn open_socket(&mut self) -> Option<AgentEvent> {
        let connect = tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str()));
        tokio::pin!(connect);

        let attempt = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Some(AgentEvent::Teardown),
                cmd = self.commands.recv() => match cmd {
                    None => return Some(AgentEvent::Teardown),
                    Some(Command::Logout) => return Some(AgentEvent::Logout),
                    Some(Command::Retry) => {}
                    Some(Command::Send(_)) => warn!("Not connected, dropping control frame"),
                },
                result = &mut connect => break result,
            }
        };

        match attempt {
            Ok(Ok((socket, _response))) => {
                self.socket = Some(socket);
                Some(AgentEvent::Opened)
            }
            Ok(Err(e)) => {
                debug!(url = %self.url, error = %e, "Connect attempt failed");
                Some(AgentEvent::ConnectFailed)
            }
            Err(_) => {
                warn!(
                    url = %self.url,
                    timeout_ms = self.connect_timeout.as_millis() as u64,
                    "Connect attempt timed out"
                );
                Some(AgentEvent::ConnectFailed)
            }
        }
    }

    async fn send_frame(&mut self, msg: &InboundMessage) {
        let Some(socket) = self.socket.as_mut() else {
            warn!("Not connected, dropping control frame");
            return;
        };
        let text = match serde_json::to_string(msg) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to encode control frame");
                return;
            }
        };
        if let Err(e) = socket.send(Message::Text(text.into())).await {
            warn!(error = %e, "Failed to send control frame");
        }
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_message(
    socket: &mut Option<WsStream>,
) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
    match socket {
        Some(ws) => ws.next().await,
        None => std::future::pending().await,
    }
}
