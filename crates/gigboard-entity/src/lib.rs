//! # gigboard-entity
//!
//! Domain entity models for the GigBoard notification subsystem. Every
//! struct here is either a stored record or a value object handed to the
//! notification store.

pub mod notification;

pub use notification::{NewNotification, Notification, NotificationType, RelatedEntityType};
