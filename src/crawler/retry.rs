//! Linear backoff policy for request retries

use crate::config::RetryConfig;
use std::time::Duration;

/// Bounded retry policy with linearly growing pauses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Pause after the first failed attempt.
    pub base_delay: Duration,
    /// Fraction of `base_delay` added per further failed attempt.
    pub growth_rate: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            growth_rate: config.growth_rate,
        }
    }

    /// Pause to take after the failed attempt numbered `attempt` (0-based)
    ///
    /// `base_delay * (1 + attempt * growth_rate)`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1.0 + f64::from(attempt) * self.growth_rate;
        self.base_delay.mul_f64(factor)
    }

    /// Returns true if another attempt may follow the failed attempt `attempt` (0-based)
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}
