use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{ModelError, SearchError};
use crate::domain::models::RetryConfig;

/// Errors that know whether sending the same request again may succeed
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for ModelError {
    fn is_transient(&self) -> bool {
        Self::is_transient(self)
    }
}

impl Transient for SearchError {
    fn is_transient(&self) -> bool {
        Self::is_transient(self)
    }
}

/// Exponential backoff for provider requests
///
/// The n-th retry waits `initial_backoff_ms * 2^n`, capped at
/// `max_backoff_ms`. Only transient errors are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// `max_backoff_ms` is raised to `initial_backoff_ms` when smaller.
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Run `operation` until it succeeds, fails permanently or the retries run out
    ///
    /// The last error is returned unchanged.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        let mut retries = 0;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(retries, "request succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_transient() {
                debug!(error = %error, "permanent failure, not retrying");
                return Err(error);
            }
            if retries >= self.max_retries {
                warn!(attempts = retries + 1, error = %error, "giving up after transient failures");
                return Err(error);
            }

            let delay = self.delay_for(retries);
            warn!(attempt = retries + 1, delay = ?delay, error = %error, "transient failure, retrying");
            sleep(delay).await;
            retries += 1;
        }
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1_u64.checked_shl(retry).unwrap_or(u64::MAX);
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(factor)
                .min(self.max_backoff_ms),
        )
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.initial_backoff_ms, config.max_backoff_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
