//! reqwest-backed [`RemoteExecutor`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::application::resilience::{
    AddressResolver, CallOutcome, RemoteExecutor, RemoteRequest, TransportError,
};
use crate::shared::errors::InfraError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Issues one `GET {base_url}/{path}` per call. The per-call timeout comes
/// from the request; non-2xx answers are transport failures.
pub struct HttpExecutor {
    http: Client,
    resolver: Arc<dyn AddressResolver>,
}

impl HttpExecutor {
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Result<Self, InfraError> {
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self { http, resolver })
    }
}

#[async_trait]
impl RemoteExecutor for HttpExecutor {
    async fn execute(&self, request: &RemoteRequest) -> CallOutcome<Value> {
        let base = self
            .resolver
            .resolve(&request.dependency)
            .ok_or_else(|| TransportError::Unresolved(request.dependency.clone()))?;
        let url = format!("{}/{}", base, request.path.trim_start_matches('/'));

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(request.timeout)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        debug!(dependency = %request.dependency, %url, status = status.as_u16(), "Peer answered");
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()).into());
        }

        Ok(response.json::<Value>().await.map_err(TransportError::from)?)
    }
}
