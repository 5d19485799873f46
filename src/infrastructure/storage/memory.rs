//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    Cart, DomainResult, Payment, Record, Repository, RepositoryProvider, Shipment,
};

/// In-memory table for one record kind, for development and testing.
///
/// Identities are assigned from a counter starting at 1. Saving a record
/// whose identity matches a stored row overwrites that row; any other
/// identity is discarded and a fresh one assigned.
pub struct InMemoryRepository<R> {
    rows: DashMap<i32, R>,
    next_id: AtomicI32,
}

impl<R> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn save(&self, record: R) -> DomainResult<R> {
        if let Some(id) = record.id() {
            if let Some(mut row) = self.rows.get_mut(&id) {
                *row = record.clone();
                return Ok(record);
            }
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = record.with_id(id);
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<R>> {
        Ok(self.rows.get(&id).map(|r| r.value().clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<R>> {
        let mut rows: Vec<(i32, R)> = self
            .rows
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        self.rows.remove(&id);
        Ok(())
    }
}

/// One in-memory table per record kind.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    carts: InMemoryRepository<Cart>,
    payments: InMemoryRepository<Payment>,
    shipments: InMemoryRepository<Shipment>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn carts(&self) -> &dyn Repository<Cart> {
        &self.carts
    }

    fn payments(&self) -> &dyn Repository<Payment> {
        &self.payments
    }

    fn shipments(&self) -> &dyn Repository<Shipment> {
        &self.shipments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(cart_id: Option<i32>, user_id: i32) -> Cart {
        Cart { cart_id, user_id }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let repo = InMemoryRepository::<Cart>::new();
        let first = repo.save(cart(None, 4)).await.unwrap();
        let second = repo.save(cart(None, 5)).await.unwrap();
        assert_eq!(first.cart_id, Some(1));
        assert_eq!(second.cart_id, Some(2));
    }

    #[tokio::test]
    async fn known_id_overwrites_existing_row() {
        let repo = InMemoryRepository::<Cart>::new();
        let saved = repo.save(cart(None, 4)).await.unwrap();
        let updated = repo.save(cart(saved.cart_id, 6)).await.unwrap();

        assert_eq!(updated.cart_id, Some(1));
        assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().user_id, 6);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_replaced_with_generated_one() {
        let repo = InMemoryRepository::<Cart>::new();
        let saved = repo.save(cart(Some(999), 4)).await.unwrap();
        let next = repo.save(cart(None, 5)).await.unwrap();

        assert_eq!(saved.cart_id, Some(1));
        assert!(repo.find_by_id(999).await.unwrap().is_none());
        assert_eq!(next.cart_id, Some(2));
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_id() {
        let repo = InMemoryRepository::<Cart>::new();
        for user in [3, 1, 2] {
            repo.save(cart(None, user)).await.unwrap();
        }
        repo.delete_by_id(2).await.unwrap();
        repo.save(cart(None, 7)).await.unwrap();

        let ids: Vec<_> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.cart_id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = InMemoryRepository::<Cart>::new();
        let saved = repo.save(cart(None, 4)).await.unwrap();
        repo.delete_by_id(1).await.unwrap();
        assert!(repo.find_by_id(saved.cart_id.unwrap()).await.unwrap().is_none());
    }
}
