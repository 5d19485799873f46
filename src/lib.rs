//! # commerce-mesh
//!
//! Resilient aggregation layer for the commerce backend. Locally owned
//! records (carts, payments, shipments) reference objects owned by peer
//! services; reads enrich those references over HTTP through a per-peer
//! circuit breaker, retry and bulkhead, and degrade to marked placeholders
//! instead of failing.
//!
//! ## Architecture
//!
//! - **domain**: local records and the persistence boundary
//! - **application**: resilience primitives, wire objects, enrichment, services
//! - **infrastructure**: reqwest executor, in-memory storage
//! - **interfaces**: axum REST API
//! - **shared**: error types

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use interfaces::http::create_api_router;
