//! Persistence boundary for the domain layer
//!
//! Contains:
//! - `Record`: identity contract shared by every locally-owned record
//! - `Repository`: save / find / delete-by-key, the only operations the
//!   aggregation layer needs from a store
//! - `RepositoryProvider`: unified access to all per-aggregate repositories

use async_trait::async_trait;

use super::cart::Cart;
use super::payment::Payment;
use super::shipment::Shipment;
use crate::shared::errors::DomainResult;

/// A record owned by this service's store.
///
/// The identity is assigned by the store on first save; a record without an
/// identity is on the create path, a record with one is on the update path.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in not-found errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> Option<i32>;

    fn with_id(self, id: i32) -> Self;

    /// Pick this record's repository out of the provider.
    fn repository(repos: &dyn RepositoryProvider) -> &dyn Repository<Self>;
}

#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Overwrite the row keyed by `record.id()` if it exists; otherwise insert
    /// under a store-assigned identity.
    async fn save(&self, record: R) -> DomainResult<R>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<R>>;
    async fn find_all(&self) -> DomainResult<Vec<R>>;
    async fn delete_by_id(&self, id: i32) -> DomainResult<()>;
}

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let cart = repos.carts().find_by_id(4).await?;
///     let all = repos.shipments().find_all().await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn carts(&self) -> &dyn Repository<Cart>;
    fn payments(&self) -> &dyn Repository<Payment>;
    fn shipments(&self) -> &dyn Repository<Shipment>;
}
