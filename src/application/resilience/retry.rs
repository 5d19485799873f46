//! Retry with fixed or exponential backoff
//!
//! Re-issues an operation while the `should_retry` predicate calls the error
//! transient. In the protected chain the predicate is
//! [`CallError::is_retryable`](super::CallError::is_retryable), so breaker and
//! bulkhead rejections end the loop immediately.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub wait_duration: Duration,
    /// Multiplier applied to the delay after each retry (1.0 = fixed).
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_wait_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait_duration: Duration::from_secs(1),
            backoff_multiplier: 1.0,
            max_wait_duration: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Delay slept after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1.0)
            .powi(attempt.saturating_sub(1) as i32);
        let secs = (self.wait_duration.as_secs_f64() * factor).min(self.max_wait_duration.as_secs_f64());
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Execute an async operation, retrying transient errors with backoff.
///
/// Returns the first success, the first non-retryable error, or the last
/// error once `max_attempts` is exhausted.
///
/// # Example
/// ```ignore
/// let product = retry_with_backoff(
///     &RetryConfig::default(),
///     || breaker_guarded_call(&request),
///     CallError::is_retryable,
///     "product-service",
/// ).await;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Giving up"
                    );
                    return Err(err);
                }

                let delay = config.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
