//! Request handlers, one module per surface.

pub mod events;
pub mod health;
pub mod notification;
pub mod ws;
