//! Capped exponential backoff.

use std::time::Duration;

use gigboard_core::config::ReconnectConfig;

/// Reconnect delay schedule: `min(base * 2^attempt, max)`, for at most
/// `max_attempts` consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Delay before the reconnect that follows `attempt` earlier failures.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for BackoffPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self::new(config.base_delay(), config.max_delay(), config.max_attempts)
    }
}
