//! Shipment aggregate
//!
//! A shipment line references a product (`product-service`) and the order
//! it ships (`order-service`).

pub mod model;

pub use model::Shipment;
