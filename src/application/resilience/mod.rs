//! Resilient inter-service calls
//!
//! Provides the pieces each service uses to call a peer while bounding the
//! blast radius of a slow or failed one:
//! - **RemoteExecutor**: one network attempt, no retry
//! - **CircuitBreaker**: fail fast while a dependency is known bad
//! - **retry_with_backoff**: re-issue transport failures with backoff
//! - **Bulkhead**: cap concurrent in-flight calls per dependency
//! - **FallbackResolver**: placeholder when everything above gave up
//! - **Protected**: the chain above composed once per dependency
//! - **DependencyRegistry**: `DependencyKey -> Protected`, built at startup
//!
//! # Example
//!
//! ```ignore
//! let registry = DependencyRegistry::new(executor)
//!     .register(DependencyKey::PRODUCT_SERVICE, ResilienceSettings::default());
//!
//! let product: Remote<ProductDto> = registry
//!     .get(&DependencyKey::PRODUCT_SERVICE)
//!     .expect("registered")
//!     .fetch(7)
//!     .await;
//! ```

mod bulkhead;
mod circuit_breaker;
mod dependency;
mod executor;
mod fallback;
mod outcome;
mod protected;
mod registry;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use bulkhead::{Bulkhead, BulkheadConfig};
pub use circuit_breaker::{
    CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState, SlidingWindow,
};
pub use dependency::DependencyKey;
pub use executor::{AddressResolver, RemoteExecutor, RemoteRequest};
pub use fallback::{FallbackResolver, PeerResource, Remote, UnavailableReason, UNAVAILABLE};
pub use outcome::{CallError, CallOutcome, Rejection, TransportError};
pub use protected::{DependencyHealth, Protected, ResilienceSettings};
pub use registry::DependencyRegistry;
pub use retry::{retry_with_backoff, RetryConfig};
