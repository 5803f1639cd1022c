//! Core type definitions used across the GigBoard workspace.

pub mod id;

pub use id::*;
