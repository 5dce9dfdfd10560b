//! Retry policy
//!
//! Attempt `n` (1-based, counting retries only) waits `n² × base_unit`
//! before it is sent: 1, 4, 9, ... units. Only transport failures and 5xx
//! responses are retried.

use crate::transport::{ApiResponse, TransportError};
use gigclaw_core::{ApiErrorKind, ClientConfig};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_unit: Duration) -> Self {
        Self {
            max_retries,
            base_unit,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, config.backoff_unit)
    }

    /// The original attempt plus every retry
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `attempt`; zero for the first attempt
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_unit
            .saturating_mul(attempt.saturating_mul(attempt))
    }

    /// Whether an attempt's outcome is worth another try
    pub fn should_retry(outcome: &Result<ApiResponse, TransportError>) -> bool {
        match outcome {
            Err(_) => true,
            Ok(response) => ApiErrorKind::from_status(response.status).is_transient(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
