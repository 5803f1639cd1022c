//! Query parameters for the notification list endpoint.

use serde::{Deserialize, Serialize};

use gigboard_core::config::StoreConfig;

/// `?limit=N`, clamped against the store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn resolve_limit(&self, config: &StoreConfig) -> u32 {
        config.clamp_limit(self.limit)
    }
}
