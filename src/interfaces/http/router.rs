//! API router

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use super::handlers::health::HealthState;
use super::handlers::metrics::MetricsState;
use super::handlers::{health, metrics, records};
use super::middleware::{http_metrics_middleware, request_id_middleware};
use crate::application::dto::{CartDto, PaymentDto, ShipmentDto, WireObject};
use crate::application::enrichment::EnrichmentPipeline;
use crate::application::services::RecordService;
use crate::domain::RepositoryProvider;

/// Unified router state. Each handler extracts only the part it needs via
/// `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub carts: RecordService<CartDto>,
    pub payments: RecordService<PaymentDto>,
    pub shipments: RecordService<ShipmentDto>,
    pub health: HealthState,
    pub metrics: MetricsState,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        pipeline: Arc<EnrichmentPipeline>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            carts: RecordService::new(repos.clone(), pipeline.clone()),
            payments: RecordService::new(repos.clone(), pipeline.clone()),
            shipments: RecordService::new(repos, pipeline.clone()),
            health: HealthState {
                registry: pipeline.registry().clone(),
                started_at: Arc::new(Instant::now()),
            },
            metrics: MetricsState { handle: metrics },
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for RecordService<CartDto> {
    fn from_ref(s: &AppState) -> Self {
        s.carts.clone()
    }
}

impl FromRef<AppState> for RecordService<PaymentDto> {
    fn from_ref(s: &AppState) -> Self {
        s.payments.clone()
    }
}

impl FromRef<AppState> for RecordService<ShipmentDto> {
    fn from_ref(s: &AppState) -> Self {
        s.shipments.clone()
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        s.metrics.clone()
    }
}

/// `GET/POST/PUT {base}` and `GET/PUT/DELETE {base}/{id}` for one record kind.
fn record_routes<W>(router: Router<AppState>, base: &str) -> Router<AppState>
where
    W: WireObject,
    RecordService<W>: FromRef<AppState>,
{
    router
        .route(
            base,
            get(records::list::<W>)
                .post(records::create::<W>)
                .put(records::update::<W>),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(records::get_one::<W>)
                .put(records::update_by_id::<W>)
                .delete(records::delete::<W>),
        )
}

pub fn create_api_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/dependencies", get(health::dependencies))
        .route("/metrics", get(metrics::prometheus_metrics));

    let router = record_routes::<CartDto>(router, "/api/carts");
    let router = record_routes::<PaymentDto>(router, "/api/payments");
    let router = record_routes::<ShipmentDto>(router, "/api/shipments");

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::resilience::testing::ScriptedExecutor;
    use crate::application::resilience::{
        DependencyKey, DependencyRegistry, ResilienceSettings, RetryConfig, TransportError,
    };
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(executor: ScriptedExecutor) -> Router {
        let settings = ResilienceSettings {
            retry: RetryConfig {
                max_attempts: 1,
                wait_duration: Duration::ZERO,
                ..RetryConfig::default()
            },
            ..ResilienceSettings::default()
        };
        let registry = DependencyRegistry::new(Arc::new(executor))
            .register(DependencyKey::USER_SERVICE, settings.clone())
            .register(DependencyKey::PRODUCT_SERVICE, settings.clone())
            .register(DependencyKey::ORDER_SERVICE, settings);
        let pipeline = Arc::new(EnrichmentPipeline::new(Arc::new(registry)));
        let state = AppState::new(Arc::new(InMemoryRepositoryProvider::new()), pipeline, None);
        create_api_router(state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_then_read_enriched_cart() {
        let app = app(ScriptedExecutor::succeeding(
            json!({"userId": 4, "firstName": "Ada"}),
        ));

        let (status, created) =
            call(&app, "POST", "/api/carts", Some(json!({"user": {"userId": 4}}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created, json!({"cartId": 1, "user": {"userId": 4}}));

        let (status, found) = call(&app, "GET", "/api/carts/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["user"]["firstName"], "Ada");

        let (status, all) = call(&app, "GET", "/api/carts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["collection"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn peer_failure_still_returns_200_with_marked_placeholder() {
        let app = app(ScriptedExecutor::failing(TransportError::Status(503)));
        call(
            &app,
            "POST",
            "/api/shipments",
            Some(json!({"orderedQuantity": 2, "product": {"productId": 7}, "order": {"orderId": 3}})),
        )
        .await;

        let (status, body) = call(&app, "GET", "/api/shipments/1", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["productId"], 7);
        assert_eq!(body["product"]["productTitle"], "unavailable");
        assert_eq!(body["product"]["unavailable"], "transport_failure");
        assert_eq!(body["order"]["orderDesc"], "unavailable");
    }

    #[tokio::test]
    async fn missing_record_is_404_envelope() {
        let app = app(ScriptedExecutor::new());
        let (status, body) = call(&app, "GET", "/api/payments/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Payment"));
    }

    #[tokio::test]
    async fn update_without_identity_is_400() {
        let app = app(ScriptedExecutor::new());
        let (status, _) = call(
            &app,
            "PUT",
            "/api/payments",
            Some(json!({"order": {"orderId": 3}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_by_id_uses_path_identity() {
        let app = app(ScriptedExecutor::new());
        call(&app, "POST", "/api/payments", Some(json!({"order": {"orderId": 3}}))).await;

        let (status, body) = call(
            &app,
            "PUT",
            "/api/payments/1",
            Some(json!({"paymentId": 77, "isPayed": true, "paymentStatus": "COMPLETED", "order": {"orderId": 3}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["paymentId"], 1);
        assert_eq!(body["paymentStatus"], "COMPLETED");
    }

    #[tokio::test]
    async fn invalid_quantity_is_422() {
        let app = app(ScriptedExecutor::new());
        let (status, body) = call(
            &app,
            "POST",
            "/api/shipments",
            Some(json!({"orderedQuantity": 0, "product": {"productId": 7}, "order": {"orderId": 3}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("orderedQuantity must be at least 1"));
    }

    #[tokio::test]
    async fn delete_then_delete_again_is_404() {
        let app = app(ScriptedExecutor::new());
        call(&app, "POST", "/api/carts", Some(json!({"user": {"userId": 4}}))).await;

        let (status, body) = call(&app, "DELETE", "/api/carts/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(true));

        let (status, _) = call(&app, "DELETE", "/api/carts/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dependency_health_lists_all_peers() {
        let app = app(ScriptedExecutor::new());
        let (status, body) = call(&app, "GET", "/health/dependencies", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        let names: Vec<_> = body["dependencies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["dependency"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["order-service", "product-service", "user-service"]);
        assert_eq!(body["dependencies"][0]["circuit"]["state"], "CLOSED");
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_503() {
        let app = app(ScriptedExecutor::new());
        let (status, _) = call(&app, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
