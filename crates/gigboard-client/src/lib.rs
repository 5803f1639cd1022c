//! # gigboard-client
//!
//! Client side of the notification channel. One [`NotificationAgent`] owns
//! one logical connection per signed-in session, reconnects with capped
//! exponential backoff after abnormal closes, and turns pushed frames into
//! [`AgentNotice`]s for the consumer.

pub mod agent;
pub mod backoff;
pub mod cache;
pub mod error;
pub mod machine;

pub use agent::{AgentHandle, NotificationAgent};
pub use backoff::BackoffPolicy;
pub use cache::NotificationCache;
pub use error::ClientError;
pub use machine::{AgentAction, AgentEvent, AgentNotice, ConnectionState, ReconnectMachine};
