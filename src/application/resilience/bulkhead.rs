//! Per-dependency concurrency admission limiter

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::{DependencyKey, Rejection};

#[derive(Debug, Clone)]
pub struct BulkheadConfig {
    pub max_concurrent_calls: usize,
    /// Zero means fail fast: a full bulkhead rejects immediately.
    pub max_wait_duration: Duration,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 10,
            max_wait_duration: Duration::ZERO,
        }
    }
}

/// Caps in-flight calls to one dependency so a slow peer cannot starve
/// callers of healthy ones. Callers over the cap are rejected, never queued
/// beyond `max_wait_duration`.
pub struct Bulkhead {
    dependency: DependencyKey,
    semaphore: Arc<Semaphore>,
    config: BulkheadConfig,
}

impl Bulkhead {
    pub fn new(dependency: DependencyKey, config: BulkheadConfig) -> Self {
        let capacity = config.max_concurrent_calls.max(1);
        Self {
            dependency,
            semaphore: Arc::new(Semaphore::new(capacity)),
            config: BulkheadConfig {
                max_concurrent_calls: capacity,
                ..config
            },
        }
    }

    /// Admit one call. The permit is released when dropped, including when
    /// the calling future is cancelled.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, Rejection> {
        let permit = if self.config.max_wait_duration.is_zero() {
            self.semaphore.clone().try_acquire_owned().ok()
        } else {
            tokio::time::timeout(
                self.config.max_wait_duration,
                self.semaphore.clone().acquire_owned(),
            )
            .await
            .ok()
            .and_then(Result::ok)
        };

        permit.ok_or_else(|| {
            debug!(
                dependency = %self.dependency,
                capacity = self.config.max_concurrent_calls,
                "Bulkhead full"
            );
            Rejection::BulkheadFull
        })
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.config.max_concurrent_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_beyond_capacity_and_recovers_on_release() {
        let bulkhead = Bulkhead::new(
            DependencyKey::USER_SERVICE,
            BulkheadConfig {
                max_concurrent_calls: 2,
                ..Default::default()
            },
        );

        let a = bulkhead.acquire().await.expect("first");
        let _b = bulkhead.acquire().await.expect("second");
        assert_eq!(bulkhead.acquire().await.err(), Some(Rejection::BulkheadFull));
        assert_eq!(bulkhead.available(), 0);

        drop(a);
        assert!(bulkhead.acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_up_to_max_wait_duration() {
        let bulkhead = Arc::new(Bulkhead::new(
            DependencyKey::USER_SERVICE,
            BulkheadConfig {
                max_concurrent_calls: 1,
                max_wait_duration: Duration::from_millis(100),
            },
        ));

        let held = bulkhead.acquire().await.expect("first");
        assert_eq!(bulkhead.acquire().await.err(), Some(Rejection::BulkheadFull));

        let waiter = {
            let bulkhead = bulkhead.clone();
            tokio::spawn(async move { bulkhead.acquire().await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(held);
        assert!(waiter.await.expect("join"));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let bulkhead = Bulkhead::new(
            DependencyKey::USER_SERVICE,
            BulkheadConfig {
                max_concurrent_calls: 0,
                ..Default::default()
            },
        );
        assert_eq!(bulkhead.capacity(), 1);
    }
}
