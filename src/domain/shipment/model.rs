//! Shipment domain entity

use crate::domain::repositories::{Record, Repository, RepositoryProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    pub shipment_id: Option<i32>,
    pub product_id: i32,
    pub order_id: i32,
    pub ordered_quantity: i32,
}

impl Record for Shipment {
    const ENTITY: &'static str = "Shipment";

    fn id(&self) -> Option<i32> {
        self.shipment_id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.shipment_id = Some(id);
        self
    }

    fn repository(repos: &dyn RepositoryProvider) -> &dyn Repository<Self> {
        repos.shipments()
    }
}
