//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a missing file is valid.

pub mod app;
pub mod client;
pub mod database;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::client::ReconnectConfig;
pub use self::database::{DatabaseConfig, StoreConfig, StoreProvider};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration sources
/// (default.toml + environment overlay + `GIGBOARD__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Notification store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Realtime channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Client reconnection settings.
    #[serde(default)]
    pub client: ReconnectConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default`, the `config/{env}` overlay, and environment
    /// variables prefixed with `GIGBOARD__` (e.g. `GIGBOARD__SERVER__PORT`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", Some(&format!("config/{env}")))
    }

    /// Load configuration from an explicit base file and optional overlay.
    pub fn load_from(base: &str, overlay: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(base).required(false));

        if let Some(overlay) = overlay {
            builder = builder.add_source(config::File::with_name(overlay).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("GIGBOARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
