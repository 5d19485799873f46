//! Payment aggregate
//!
//! A payment settles an order owned by `order-service`.

pub mod model;

pub use model::{Payment, PaymentStatus};
