//! Application configuration
//!
//! Loaded from a TOML file, by default `~/.config/commerce-mesh/config.toml`.
//! Every field has a default, so a missing file or a partial one is fine.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [pipeline]
//! max_concurrent_items = 8
//!
//! [dependencies.product-service]
//! base_url = "http://localhost:8500"
//! call_timeout_ms = 4000
//!
//! [dependencies.product-service.circuit_breaker]
//! failure_rate_threshold = 50.0
//! sliding_window_type = "count_based"
//! sliding_window_size = 20
//!
//! [dependencies.product-service.retry]
//! max_attempts = 3
//! wait_duration_ms = 1000
//!
//! [dependencies.product-service.bulkhead]
//! max_concurrent_calls = 10
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::resilience::{
    BulkheadConfig, CircuitBreakerConfig, DependencyKey, ResilienceSettings, RetryConfig,
    SlidingWindow,
};
use crate::shared::errors::InfraError;

pub const CONFIG_ENV: &str = "COMMERCE_MESH_CONFIG";

/// `~/.config/commerce-mesh/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("commerce-mesh").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub dependencies: BTreeMap<String, DependencyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on in-flight requests during graceful shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrent_items: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_items: crate::application::enrichment::DEFAULT_MAX_CONCURRENT_ITEMS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub base_url: String,
    pub call_timeout_ms: u64,
    pub circuit_breaker: CircuitBreakerSection,
    pub retry: RetrySection,
    pub bulkhead: BulkheadSection,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            call_timeout_ms: 4_000,
            circuit_breaker: CircuitBreakerSection::default(),
            retry: RetrySection::default(),
            bulkhead: BulkheadSection::default(),
        }
    }
}

impl DependencyConfig {
    fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn settings(&self) -> ResilienceSettings {
        ResilienceSettings {
            circuit_breaker: (&self.circuit_breaker).into(),
            retry: (&self.retry).into(),
            bulkhead: (&self.bulkhead).into(),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlidingWindowType {
    CountBased,
    TimeBased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSection {
    pub failure_rate_threshold: f64,
    pub sliding_window_type: SlidingWindowType,
    /// Calls for `count_based`, seconds for `time_based`.
    pub sliding_window_size: u64,
    pub minimum_number_of_calls: usize,
    pub wait_duration_in_open_state_ms: u64,
    pub permitted_calls_in_half_open_state: u32,
}

impl Default for CircuitBreakerSection {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_type: SlidingWindowType::CountBased,
            sliding_window_size: 20,
            minimum_number_of_calls: 10,
            wait_duration_in_open_state_ms: 10_000,
            permitted_calls_in_half_open_state: 3,
        }
    }
}

impl From<&CircuitBreakerSection> for CircuitBreakerConfig {
    fn from(s: &CircuitBreakerSection) -> Self {
        let sliding_window = match s.sliding_window_type {
            SlidingWindowType::CountBased => SlidingWindow::CountBased(s.sliding_window_size as usize),
            SlidingWindowType::TimeBased => {
                SlidingWindow::TimeBased(Duration::from_secs(s.sliding_window_size))
            }
        };
        Self {
            failure_rate_threshold: s.failure_rate_threshold,
            sliding_window,
            minimum_number_of_calls: s.minimum_number_of_calls,
            wait_duration_in_open_state: Duration::from_millis(s.wait_duration_in_open_state_ms),
            permitted_calls_in_half_open_state: s.permitted_calls_in_half_open_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub wait_duration_ms: u64,
    pub backoff_multiplier: f64,
    pub max_wait_duration_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait_duration_ms: 1_000,
            backoff_multiplier: 1.0,
            max_wait_duration_ms: 10_000,
        }
    }
}

impl From<&RetrySection> for RetryConfig {
    fn from(s: &RetrySection) -> Self {
        Self {
            max_attempts: s.max_attempts,
            wait_duration: Duration::from_millis(s.wait_duration_ms),
            backoff_multiplier: s.backoff_multiplier,
            max_wait_duration: Duration::from_millis(s.max_wait_duration_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkheadSection {
    pub max_concurrent_calls: usize,
    pub max_wait_duration_ms: u64,
}

impl Default for BulkheadSection {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 10,
            max_wait_duration_ms: 0,
        }
    }
}

impl From<&BulkheadSection> for BulkheadConfig {
    fn from(s: &BulkheadSection) -> Self {
        Self {
            max_concurrent_calls: s.max_concurrent_calls,
            max_wait_duration: Duration::from_millis(s.max_wait_duration_ms),
        }
    }
}

/// Peers the three record kinds enrich from, with their local default ports.
const DEFAULT_DEPENDENCIES: [(DependencyKey, &str); 3] = [
    (DependencyKey::USER_SERVICE, "http://localhost:8700"),
    (DependencyKey::PRODUCT_SERVICE, "http://localhost:8500"),
    (DependencyKey::ORDER_SERVICE, "http://localhost:8300"),
];

impl AppConfig {
    /// Read and validate the file at `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| InfraError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw)?
        } else {
            Self::default().with_default_dependencies()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        let config: Self = toml::from_str(raw)?;
        Ok(config.with_default_dependencies())
    }

    /// Fill in any of the well-known peers the file did not mention, and
    /// the `base_url` of those it mentioned without one.
    pub fn with_default_dependencies(mut self) -> Self {
        for (key, base_url) in DEFAULT_DEPENDENCIES {
            self.dependencies
                .entry(key.to_string())
                .and_modify(|dep| {
                    if dep.base_url.trim().is_empty() {
                        dep.base_url = base_url.to_string();
                    }
                })
                .or_insert_with(|| DependencyConfig::with_base_url(base_url));
        }
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// `(DependencyKey, settings)` for every configured peer.
    pub fn resilience_settings(&self) -> Vec<(DependencyKey, ResilienceSettings)> {
        self.dependencies
            .iter()
            .map(|(name, dep)| (DependencyKey::new(name.clone()), dep.settings()))
            .collect()
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        let invalid = |msg: String| Err(InfraError::ConfigInvalid(msg));

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return invalid(format!(
                "logging.format must be \"text\" or \"json\", got {:?}",
                self.logging.format
            ));
        }
        if self.pipeline.max_concurrent_items == 0 {
            return invalid("pipeline.max_concurrent_items must be at least 1".into());
        }

        for (name, dep) in &self.dependencies {
            if !(dep.base_url.starts_with("http://") || dep.base_url.starts_with("https://")) {
                return invalid(format!("dependencies.{name}.base_url must be an http(s) URL"));
            }
            if dep.call_timeout_ms == 0 {
                return invalid(format!("dependencies.{name}.call_timeout_ms must be positive"));
            }
            let cb = &dep.circuit_breaker;
            if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 100.0) {
                return invalid(format!(
                    "dependencies.{name}.circuit_breaker.failure_rate_threshold must be in (0, 100]"
                ));
            }
            if cb.sliding_window_size == 0 || cb.permitted_calls_in_half_open_state == 0 {
                return invalid(format!(
                    "dependencies.{name}.circuit_breaker window and half-open permits must be positive"
                ));
            }
            if dep.retry.backoff_multiplier < 1.0 {
                return invalid(format!(
                    "dependencies.{name}.retry.backoff_multiplier must be at least 1.0"
                ));
            }
            if dep.bulkhead.max_concurrent_calls == 0 {
                return invalid(format!(
                    "dependencies.{name}.bulkhead.max_concurrent_calls must be at least 1"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gets_all_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dependencies.len(), 3);
        assert_eq!(
            config.dependencies["product-service"].base_url,
            "http://localhost:8500"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_dependency_section_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [dependencies.order-service]
            base_url = "http://orders:9000"

            [dependencies.order-service.retry]
            max_attempts = 5
            backoff_multiplier = 2.0
            "#,
        )
        .unwrap();

        let order = &config.dependencies["order-service"];
        assert_eq!(order.base_url, "http://orders:9000");
        assert_eq!(order.call_timeout_ms, 4_000);

        let settings = order.settings();
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.wait_duration, Duration::from_secs(1));
        assert_eq!(settings.bulkhead.max_concurrent_calls, 10);
        assert_eq!(config.dependencies.len(), 3);
    }

    #[test]
    fn time_based_window_is_in_seconds() {
        let config = AppConfig::from_toml(
            r#"
            [dependencies.user-service.circuit_breaker]
            sliding_window_type = "time_based"
            sliding_window_size = 30
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        let user = &config.dependencies["user-service"];
        assert_eq!(user.base_url, "http://localhost:8700");
        assert_eq!(
            user.settings().circuit_breaker.sliding_window,
            SlidingWindow::TimeBased(Duration::from_secs(30))
        );
    }

    #[test]
    fn partial_section_for_well_known_peer_keeps_default_url() {
        let config = AppConfig::from_toml(
            r#"
            [dependencies.product-service.circuit_breaker]
            sliding_window_size = 5
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        let product = &config.dependencies["product-service"];
        assert_eq!(product.base_url, "http://localhost:8500");
        assert_eq!(
            product.settings().circuit_breaker.sliding_window,
            SlidingWindow::CountBased(5)
        );
    }

    #[test]
    fn unknown_peer_without_url_is_rejected() {
        let config = AppConfig::from_toml(
            r#"
            [dependencies.favourite-service.retry]
            max_attempts = 2
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(InfraError::ConfigInvalid(_))));
    }

    #[test]
    fn nonsensical_values_are_rejected() {
        let mut config = AppConfig::from_toml("").unwrap();
        config
            .dependencies
            .get_mut("user-service")
            .unwrap()
            .circuit_breaker
            .failure_rate_threshold = 0.0;
        assert!(matches!(config.validate(), Err(InfraError::ConfigInvalid(_))));

        let mut config = AppConfig::from_toml("").unwrap();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/commerce-mesh.toml")).unwrap();
        assert_eq!(config.resilience_settings().len(), 3);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[server\nport = 1"),
            Err(InfraError::ConfigParse(_))
        ));
    }
}
