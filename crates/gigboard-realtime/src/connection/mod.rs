//! Connection handles and the per-user registry.

pub mod handle;
pub mod registry;

pub use handle::{ConnectionHandle, SendOutcome};
pub use registry::ConnectionRegistry;
