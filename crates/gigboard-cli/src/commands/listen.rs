//! Run the client agent against a server and print notices.

use clap::Args;
use serde::Serialize;

use gigboard_client::{AgentNotice, NotificationAgent};
use gigboard_core::error::AppError;
use gigboard_core::types::UserId;

use crate::output::{self, OutputFormat};

/// Arguments for the listen command
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Realtime endpoint, e.g. ws://127.0.0.1:8080/ws
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    pub url: String,

    /// User to listen as
    #[arg(long)]
    pub user: UserId,

    /// Exit after this many notifications
    #[arg(long)]
    pub count: Option<usize>,
}

/// One printed line in JSON mode.
#[derive(Debug, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
enum NoticeLine<'a> {
    Connected,
    Alert {
        notification: &'a gigboard_entity::notification::Notification,
    },
    Reconnecting {
        attempt: u32,
        delay_ms: u64,
    },
    Offline,
    Rejected,
    Closed,
}

/// Execute the listen command
pub async fn execute(args: &ListenArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let url = NotificationAgent::url_for(&args.url, args.user);

    let mut agent = NotificationAgent::spawn(&config.client, url)
        .map_err(|e| AppError::validation(e.to_string()))?;
    let mut received = 0usize;

    loop {
        let next = tokio::select! {
            notice = agent.next_notice() => Some(notice),
            _ = tokio::signal::ctrl_c() => None,
        };
        // Interrupted or agent stopped.
        let Some(Some(notice)) = next else { break };

        let line = match &notice {
            AgentNotice::Connected => NoticeLine::Connected,
            AgentNotice::Alert(n) => NoticeLine::Alert { notification: n },
            AgentNotice::Reconnecting { attempt, delay } => NoticeLine::Reconnecting {
                attempt: *attempt,
                delay_ms: delay.as_millis() as u64,
            },
            AgentNotice::Offline => NoticeLine::Offline,
            AgentNotice::Rejected => NoticeLine::Rejected,
            AgentNotice::Closed => NoticeLine::Closed,
            AgentNotice::Invalidate => continue,
        };
        print_notice(&line, format);

        match notice {
            AgentNotice::Alert(_) => {
                received += 1;
                if args.count.is_some_and(|max| received >= max) {
                    break;
                }
            }
            AgentNotice::Offline | AgentNotice::Rejected | AgentNotice::Closed => break,
            _ => {}
        }
    }

    agent.close().await;
    Ok(())
}

fn print_notice(line: &NoticeLine<'_>, format: OutputFormat) {
    match (format, line) {
        (OutputFormat::Json, _) => output::print_item(line, format),
        (_, NoticeLine::Connected) => output::print_success("Connected"),
        (_, NoticeLine::Alert { notification }) => {
            println!("[{}] {}: {}", notification.kind, notification.title, notification.message)
        }
        (_, NoticeLine::Reconnecting { attempt, delay_ms }) => {
            println!("Connection lost, retry {attempt} in {delay_ms}ms")
        }
        (_, NoticeLine::Offline) => output::print_error("Offline: reconnect attempts exhausted"),
        (_, NoticeLine::Rejected) => output::print_error("Rejected: unknown user identity"),
        (_, NoticeLine::Closed) => println!("Connection closed"),
    }
}
