//! Remote call executor port
//!
//! [`RemoteExecutor`] issues exactly one network attempt to a resolved peer.
//! It never retries and never panics: every failure comes back as a
//! [`TransportError`](super::TransportError). The production implementation
//! is [`HttpExecutor`](crate::infrastructure::remote::HttpExecutor).

use std::time::Duration;

use async_trait::async_trait;

use super::{CallOutcome, DependencyKey};

/// One outbound `GET` against a peer.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub dependency: DependencyKey,
    /// Path relative to the peer's base address, e.g. `product-service/api/products/7`.
    pub path: String,
    pub timeout: Duration,
}

#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, request: &RemoteRequest) -> CallOutcome<serde_json::Value>;
}

/// Turns a logical peer name into a reachable base URL.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, dependency: &DependencyKey) -> Option<String>;
}
