//! Explicit composition of the protected call chain for one dependency
//!
//! Composition order (outside-in):
//! 1. Bulkhead - admission, held for the whole retry loop
//! 2. Retry - re-issues transport failures only
//! 3. Circuit breaker - per attempt; open means reject without calling
//! 4. Executor - exactly one network attempt
//!
//! [`Protected::fetch`] adds the fallback on top, so it never fails.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{
    retry_with_backoff, Bulkhead, BulkheadConfig, CallError, CallOutcome, CircuitBreaker,
    CircuitBreakerConfig, CircuitSnapshot, DependencyKey, FallbackResolver, PeerResource, Remote,
    RemoteExecutor, RemoteRequest, RetryConfig, TransportError,
};

/// Everything configurable about one dependency.
#[derive(Debug, Clone)]
pub struct ResilienceSettings {
    pub circuit_breaker: CircuitBreakerConfig,
    pub retry: RetryConfig,
    pub bulkhead: BulkheadConfig,
    pub call_timeout: Duration,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            circuit_breaker: CircuitBreakerConfig::default(),
            retry: RetryConfig::default(),
            bulkhead: BulkheadConfig::default(),
            call_timeout: Duration::from_secs(4),
        }
    }
}

/// Health view of one dependency.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyHealth {
    pub dependency: String,
    pub circuit: CircuitSnapshot,
    pub bulkhead_available: usize,
    pub bulkhead_capacity: usize,
}

pub struct Protected {
    dependency: DependencyKey,
    breaker: CircuitBreaker,
    bulkhead: Bulkhead,
    retry: RetryConfig,
    call_timeout: Duration,
    executor: Arc<dyn RemoteExecutor>,
    fallback: FallbackResolver,
}

impl Protected {
    pub fn new(
        dependency: DependencyKey,
        settings: ResilienceSettings,
        executor: Arc<dyn RemoteExecutor>,
    ) -> Self {
        Self {
            breaker: CircuitBreaker::new(dependency.clone(), settings.circuit_breaker),
            bulkhead: Bulkhead::new(dependency.clone(), settings.bulkhead),
            retry: settings.retry,
            call_timeout: settings.call_timeout,
            executor,
            fallback: FallbackResolver,
            dependency,
        }
    }

    pub fn health(&self) -> DependencyHealth {
        DependencyHealth {
            dependency: self.dependency.to_string(),
            circuit: self.breaker.snapshot(),
            bulkhead_available: self.bulkhead.available(),
            bulkhead_capacity: self.bulkhead.capacity(),
        }
    }

    /// Fetch `T` by identity; failures become a placeholder.
    pub async fn fetch<T: PeerResource>(&self, id: i32) -> Remote<T> {
        let path = format!("{}/{}", T::RESOURCE, id);
        match self.call::<T>(&path).await {
            Ok(value) => Remote::Present(value),
            Err(err) => self.fallback.resolve(&self.dependency, id, &err),
        }
    }

    /// Run the protected chain without a fallback.
    pub async fn call<T: DeserializeOwned>(&self, path: &str) -> CallOutcome<T> {
        let outcome = match self.bulkhead.acquire().await {
            Ok(_permit) => {
                retry_with_backoff(
                    &self.retry,
                    || self.attempt::<T>(path),
                    CallError::is_retryable,
                    self.dependency.as_str(),
                )
                .await
            }
            Err(rejection) => Err(CallError::Rejected(rejection)),
        };

        let label = match &outcome {
            Ok(_) => "success",
            Err(err) => err.label(),
        };
        metrics::counter!(
            "remote_calls_total",
            "dependency" => self.dependency.to_string(),
            "outcome" => label
        )
        .increment(1);

        outcome
    }

    async fn attempt<T: DeserializeOwned>(&self, path: &str) -> CallOutcome<T> {
        let permit = self.breaker.try_acquire()?;

        let request = RemoteRequest {
            dependency: self.dependency.clone(),
            path: path.to_string(),
            timeout: self.call_timeout,
        };
        debug!(dependency = %self.dependency, path, "Calling peer");

        let outcome = self.executor.execute(&request).await.and_then(|payload| {
            serde_json::from_value::<T>(payload)
                .map_err(|e| CallError::Transport(TransportError::from(e)))
        });

        permit.record(outcome.is_ok());
        outcome
    }
}

// ── Tests ──────────────────────────────────────────────────────
