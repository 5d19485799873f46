//! Cart aggregate
//!
//! A cart belongs to a user owned by `user-service`.

pub mod model;

pub use model::Cart;
