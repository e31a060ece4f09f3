use crate::store::StoreError;
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after `delay`, grown by the multiplier and capped at `max_delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.backoff_multiplier.max(1.0)).min(self.max_delay)
    }
}

/// Retries `operation` while it fails with a transient [`StoreError`].
/// Only use this for idempotent reads.
pub async fn retry_with_exponential_backoff<T, F, Fut>(config: &RetryConfig, operation: F) -> Result<T, StoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.base_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("Read recovered on attempt {} of {}", attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                debug!("Not retrying after attempt {}: {}", attempt, e);
                return Err(e);
            }
            Err(e) if attempt >= attempts => {
                warn!("Giving up after {} attempts: {}", attempts, e);
                return Err(e);
            }
            Err(e) => {
                debug!("Attempt {} hit a transient error, next try in {:?}: {}", attempt, delay, e);
                tokio::time::sleep(delay).await;
                delay = config.next_delay(delay);
                attempt += 1;
            }
        }
    }
}
