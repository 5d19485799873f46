//! Enrichment of wire objects with peer-owned data
//!
//! A wire object leaves the mapping helper with every nested peer field set
//! to a [`Remote::Reference`]. The pipeline replaces each reference with
//! either the peer's payload or a marked placeholder, so an enriched object
//! never carries an unresolved reference and enrichment itself never fails.
//!
//! Collections fan out with at most `max_concurrent_items` objects in
//! flight; results come back in input order. Each reference triggers its own
//! peer call, so a collection of N objects issues N calls per nested field
//! even when they share an identity.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{error, warn};

use super::resilience::{DependencyRegistry, PeerResource, Remote, UnavailableReason};

/// Default number of objects enriched concurrently within one collection.
pub const DEFAULT_MAX_CONCURRENT_ITEMS: usize = 8;

/// A wire object with nested peer fields.
#[async_trait]
pub trait Enrichable: Sized + Send + 'static {
    /// Resolve every nested reference. Independent fields may be resolved
    /// concurrently.
    async fn enrich(self, pipeline: &EnrichmentPipeline) -> Self;
}

pub struct EnrichmentPipeline {
    registry: Arc<DependencyRegistry>,
    max_concurrent_items: usize,
}

impl EnrichmentPipeline {
    pub fn new(registry: Arc<DependencyRegistry>) -> Self {
        Self {
            registry,
            max_concurrent_items: DEFAULT_MAX_CONCURRENT_ITEMS,
        }
    }

    pub fn with_max_concurrent_items(mut self, max_concurrent_items: usize) -> Self {
        self.max_concurrent_items = max_concurrent_items.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<DependencyRegistry> {
        &self.registry
    }

    /// Resolve one nested field. Already-resolved values pass through.
    pub async fn resolve<T: PeerResource>(&self, remote: Remote<T>) -> Remote<T> {
        let shell = match remote {
            Remote::Reference(shell) => shell,
            resolved => return resolved,
        };

        let Some(id) = shell.id() else {
            warn!(resource = T::RESOURCE, "Reference without identity");
            return Remote::Unavailable {
                placeholder: shell,
                reason: UnavailableReason::MissingReference,
            };
        };

        match self.registry.get(&T::DEPENDENCY) {
            Some(protected) => protected.fetch(id).await,
            None => {
                error!(
                    dependency = %T::DEPENDENCY,
                    resource = T::RESOURCE,
                    "No protected handle registered"
                );
                Remote::unavailable(id, UnavailableReason::Unconfigured)
            }
        }
    }

    pub async fn enrich_one<E: Enrichable>(&self, item: E) -> E {
        item.enrich(self).await
    }

    /// Enrich a collection, preserving order and length.
    pub async fn enrich_all<E: Enrichable>(&self, items: Vec<E>) -> Vec<E> {
        stream::iter(items)
            .map(|item| item.enrich(self))
            .buffered(self.max_concurrent_items)
            .collect()
            .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
