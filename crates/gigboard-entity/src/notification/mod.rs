//! Notification domain entities.

pub mod kind;
pub mod model;
pub mod new;

pub use kind::{NotificationType, RelatedEntityType};
pub use model::Notification;
pub use new::NewNotification;
