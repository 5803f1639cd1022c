//! Concrete PostgreSQL repositories.

pub mod notification;
