use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::ClientError;
use crate::domain::models::CacheConfig;

/// Retry policy applied to cache fetches
///
/// Backoff doubles with each retry, capped at `max_backoff_ms`.
///
/// # Retry Decision
/// - Retry on: transport failures, any error status, undecodable bodies
/// - Do NOT retry: local validation errors and cache type mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    max_retries: u32,
    /// Delay before the first retry in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Example
    /// ```
    /// use doubletrust::services::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(1, 1_000, 30_000);
    /// assert_eq!(policy.max_retries(), 1);
    /// ```
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// A policy that never retries.
    pub const fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute an operation, retrying retryable failures
    ///
    /// # Returns
    /// * `Ok(T)` - Operation succeeded
    /// * `Err(ClientError)` - Local failure, or last failure once retries
    ///   ran out
    ///   once retries ran out
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, attempt) {
                        let backoff = self.calculate_backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            error = %err,
                            backoff_ms = backoff.as_millis() as u64,
                            "fetch failed, retrying"
                        );

                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if attempt >= self.max_retries && err.is_retryable() {
                            warn!("Operation failed after {} attempts: {}", attempt + 1, err);
                        } else {
                            debug!("Permanent error, not retrying: {}", err);
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Calculate exponential backoff duration for a given attempt
    ///
    /// Formula: min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &ClientError, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        error.is_retryable()
    }
}

impl Default for RetryPolicy {
    /// One retry after 1 second, matching [`CacheConfig::default`].
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for RetryPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self::new(
            config.retry_count,
            config.retry_delay_ms,
            config.max_retry_delay_ms,
        )
    }
}
