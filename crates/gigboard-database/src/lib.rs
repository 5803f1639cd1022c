//! # gigboard-database
//!
//! Notification persistence for GigBoard: the [`NotificationStore`]
//! collaborator trait, a PostgreSQL implementation backed by sqlx, an
//! in-process implementation, and provider selection from configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryNotificationStore;
pub use provider::build_store;
pub use repositories::notification::PgNotificationStore;
pub use store::NotificationStore;
