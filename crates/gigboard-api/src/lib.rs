//! # gigboard-api
//!
//! HTTP API layer for GigBoard built on Axum.
//!
//! Provides the realtime WebSocket upgrade, the notification REST
//! endpoints, domain-event ingestion from the CRUD layer, health checks,
//! the caller-identity extractor, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
