pub mod cart;
pub mod payment;
pub mod repositories;
pub mod shipment;

// Re-export commonly used types
pub use cart::Cart;
pub use payment::{Payment, PaymentStatus};
pub use repositories::{Record, Repository, RepositoryProvider};
pub use shipment::Shipment;

pub use crate::shared::errors::{DomainError, DomainResult};
