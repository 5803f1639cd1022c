//! # gigboard-realtime
//!
//! Realtime notification fan-out for GigBoard. Provides:
//!
//! - An in-process registry of each user's open WebSocket connections
//! - A best-effort broadcaster that pushes one frame to all of a user's connections
//! - The gateway that owns the per-connection lifecycle and inbound control frames
//! - The typed catalog of marketplace events and the service that persists then pushes them

pub mod broadcast;
pub mod connection;
pub mod gateway;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use broadcast::Broadcaster;
pub use connection::{ConnectionHandle, ConnectionRegistry};
pub use gateway::RealtimeGateway;
pub use message::{InboundMessage, OutboundMessage};
pub use metrics::RealtimeMetrics;
pub use notification::{DomainEvent, NotificationService};
pub use server::RealtimeEngine;
