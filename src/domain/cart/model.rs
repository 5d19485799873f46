//! Cart domain entity

use crate::domain::repositories::{Record, Repository, RepositoryProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub cart_id: Option<i32>,
    /// Foreign reference into `user-service`
    pub user_id: i32,
}

impl Record for Cart {
    const ENTITY: &'static str = "Cart";

    fn id(&self) -> Option<i32> {
        self.cart_id
    }

    fn with_id(mut self, id: i32) -> Self {
        self.cart_id = Some(id);
        self
    }

    fn repository(repos: &dyn RepositoryProvider) -> &dyn Repository<Self> {
        repos.carts()
    }
}
