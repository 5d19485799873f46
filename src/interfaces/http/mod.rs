//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, `ValidatedJson`
//! - `handlers`: generic record handlers, health, metrics
//! - `middleware`: request id, request metrics
//! - `router`: route table and unified state

pub mod common;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use router::{create_api_router, AppState};
