//! Marketplace event catalog and the notification service.

pub mod events;
pub mod formatter;
pub mod service;

pub use events::{DomainEvent, NotificationEvent};
pub use formatter::NotificationFormatter;
pub use service::NotificationService;
