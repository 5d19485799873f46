//! Health check handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::application::resilience::{CircuitState, DependencyHealth, DependencyRegistry};

#[derive(Clone)]
pub struct HealthState {
    pub registry: Arc<DependencyRegistry>,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependenciesResponse {
    /// `degraded` while any breaker is not closed.
    pub status: &'static str,
    pub dependencies: Vec<DependencyHealth>,
}

/// `GET /health` - liveness
pub async fn liveness(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// `GET /health/dependencies` - breaker and bulkhead snapshot per peer.
///
/// Always 200: a degraded peer degrades responses, not this service.
pub async fn dependencies(State(state): State<HealthState>) -> Json<DependenciesResponse> {
    let dependencies = state.registry.health();
    let degraded = dependencies
        .iter()
        .any(|d| d.circuit.state != CircuitState::Closed);

    Json(DependenciesResponse {
        status: if degraded { "degraded" } else { "ok" },
        dependencies,
    })
}
