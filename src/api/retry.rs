use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::errors::ApiError;

/// Bounded retry with exponential backoff for transient catalog failures.
///
/// Retry lives here, below the caching layer and above the raw transport;
/// nothing in the crate polls without a bound.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the initial one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay_ms: u64,
    /// Cap on the per-attempt delay.
    pub max_delay_ms: u64,
    /// Budget for all attempts combined.
    pub total_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
            total_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            total_timeout: Duration::from_secs(30),
        }
    }

    /// min(base_delay * 2^attempt, max_delay)
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    /// Run `f`, retrying transient failures until the attempt or time budget
    /// runs out. Permanent errors return immediately.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        let start_time = std::time::Instant::now();
        let mut last_error = None;

        for attempt in 0..=self.max_attempts {
            if start_time.elapsed() >= self.total_timeout {
                warn!(
                    "{}: exceeded total timeout of {:?} after {} attempts",
                    operation_name, self.total_timeout, attempt
                );
                break;
            }

            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!("{}: succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !err.is_transient() {
                        return Err(err);
                    }

                    debug!("{}: transient error: {}", operation_name, err);
                    last_error = Some(err.clone());

                    if attempt < self.max_attempts {
                        let delay = if let Some(retry_after) = err.retry_after() {
                            Duration::from_secs(retry_after)
                                .min(Duration::from_millis(self.max_delay_ms))
                        } else {
                            self.calculate_delay(attempt)
                        };

                        debug!(
                            "{}: waiting {:?} before retry {} of {}",
                            operation_name,
                            delay,
                            attempt + 1,
                            self.max_attempts
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        if let Some(err) = last_error {
            warn!(
                "{}: all {} attempts failed, last error: {}",
                operation_name,
                self.max_attempts + 1,
                err
            );
            Err(err)
        } else {
            Err(ApiError::Network(format!(
                "{}: all attempts failed with no error captured",
                operation_name
            )))
        }
    }
}
