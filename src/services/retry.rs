//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

/// Whether a failed attempt is worth repeating
pub enum RetryStrategy {
    /// Transient failure, back off and try again
    Retry,
    /// Permanent failure, give up immediately
    Fail,
}

/// Errors that know whether they are transient
pub trait Retryable {
    fn retry_strategy(&self) -> RetryStrategy;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): `base * 2^(attempt-1)`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Runs `op` until it succeeds, fails permanently or runs out of attempts
///
/// The last error is returned when every attempt failed.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(error);
                }
                if let RetryStrategy::Fail = error.retry_strategy() {
                    return Err(error);
                }

                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying: {}",
                    error
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
