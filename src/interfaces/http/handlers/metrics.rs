//! Prometheus metrics handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::interfaces::http::common::ApiResponse;

/// Handle to the process-wide recorder; absent when none was installed.
#[derive(Clone, Default)]
pub struct MetricsState {
    pub handle: Option<PrometheusHandle>,
}

/// `GET /metrics` - Prometheus scrape endpoint
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    match state.handle {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error("metrics recorder not installed")),
        )
            .into_response(),
    }
}
