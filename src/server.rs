//! Server runtime
//!
//! Wires configuration into the dependency registry, the enrichment
//! pipeline and the router, then serves until SIGINT/SIGTERM.

use std::future::IntoFuture;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

use crate::application::enrichment::EnrichmentPipeline;
use crate::application::resilience::{DependencyKey, DependencyRegistry};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{HttpExecutor, InMemoryRepositoryProvider, StaticAddressResolver};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::errors::{AppError, InfraError};

/// Peers the record services enrich from; startup fails without them.
pub const REQUIRED_DEPENDENCIES: [DependencyKey; 3] = [
    DependencyKey::USER_SERVICE,
    DependencyKey::PRODUCT_SERVICE,
    DependencyKey::ORDER_SERVICE,
];

/// Initialize tracing from the application config.
///
/// Call once at process startup. `RUST_LOG` overrides `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Install the global Prometheus recorder once per process.
///
/// Returns `None` (metrics become no-ops) if another recorder is already
/// installed.
pub fn install_metrics_recorder() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder not installed");
                None
            }
        })
        .clone()
}

/// Build the protected-call registry from config.
pub fn build_registry(config: &AppConfig) -> Result<DependencyRegistry, InfraError> {
    let resolver = config
        .dependencies
        .iter()
        .fold(StaticAddressResolver::new(), |resolver, (name, dep)| {
            resolver.with(DependencyKey::new(name.clone()), dep.base_url.clone())
        });
    let executor = HttpExecutor::new(Arc::new(resolver))?;

    let registry = config.resilience_settings().into_iter().fold(
        DependencyRegistry::new(Arc::new(executor)),
        |registry, (key, settings)| registry.register(key, settings),
    );
    registry.require(&REQUIRED_DEPENDENCIES)?;
    Ok(registry)
}

pub fn build_state(
    config: &AppConfig,
    repos: Arc<dyn RepositoryProvider>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, InfraError> {
    let registry = build_registry(config)?;
    let pipeline = EnrichmentPipeline::new(Arc::new(registry))
        .with_max_concurrent_items(config.pipeline.max_concurrent_items);
    Ok(AppState::new(repos, Arc::new(pipeline), metrics))
}

/// Serve the API until a shutdown signal arrives.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let metrics = install_metrics_recorder();
    let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
    let state = build_state(&config, repos, metrics)?;
    let router = create_api_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(InfraError::from)?;
    info!(%addr, "REST API server listening");

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = std::pin::pin!(server.into_future());

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let drain_deadline = async {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = &mut server => result.map_err(InfraError::from)?,
        _ = drain_deadline => warn!(grace_secs = grace.as_secs(), "In-flight requests did not drain in time"),
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
