//! Process-wide registry of protected dependency handles
//!
//! Built once at startup and injected into the enrichment pipeline; it is
//! the only place breaker and bulkhead state lives.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::{DependencyHealth, DependencyKey, Protected, RemoteExecutor, ResilienceSettings};
use crate::shared::errors::InfraError;

pub struct DependencyRegistry {
    executor: Arc<dyn RemoteExecutor>,
    entries: HashMap<DependencyKey, Arc<Protected>>,
}

impl DependencyRegistry {
    pub fn new(executor: Arc<dyn RemoteExecutor>) -> Self {
        Self {
            executor,
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) the protected handle for a dependency.
    pub fn register(mut self, dependency: DependencyKey, settings: ResilienceSettings) -> Self {
        info!(
            %dependency,
            max_attempts = settings.retry.max_attempts,
            bulkhead = settings.bulkhead.max_concurrent_calls,
            timeout_ms = settings.call_timeout.as_millis() as u64,
            "Dependency registered"
        );
        let protected = Protected::new(dependency.clone(), settings, self.executor.clone());
        self.entries.insert(dependency, Arc::new(protected));
        self
    }

    pub fn get(&self, dependency: &DependencyKey) -> Option<&Arc<Protected>> {
        self.entries.get(dependency)
    }

    /// Fail startup when a dependency the services enrich from is missing.
    pub fn require(&self, dependencies: &[DependencyKey]) -> Result<(), InfraError> {
        match dependencies.iter().find(|d| !self.entries.contains_key(*d)) {
            Some(missing) => Err(InfraError::MissingDependency(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn health(&self) -> Vec<DependencyHealth> {
        let mut health: Vec<_> = self.entries.values().map(|p| p.health()).collect();
        health.sort_by(|a, b| a.dependency.cmp(&b.dependency));
        health
    }
}
