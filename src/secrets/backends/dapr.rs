//! Dapr sidecar transport
//!
//! Talks to the Dapr secrets API on the local sidecar. Every configured
//! backend id is a Dapr secret store component name:
//!
//! - `GET /v1.0/secrets/{store}/{name}` returns a JSON object of key to value
//! - namespace-scoped stores (Kubernetes) get `?metadata.namespace={namespace}`
//! - `GET /v1.0/metadata` answers 200 while the sidecar is up
//!
//! The sidecar owns mTLS, store authentication and its own retries; this
//! client makes one call per lookup and only classifies the response.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::backend::{BackendSpec, BackendTransport};
use super::registry::BackendChain;
use crate::config::TransportConfig;
use crate::errors::{Error, Result};
use crate::secrets::types::{BackendId, BackendOutcome, SecretRequest, SecretString};

const API_VERSION: &str = "v1.0";
const NAMESPACE_PARAM: &str = "metadata.namespace";

/// Error payload returned by the Dapr HTTP API
#[derive(Debug, Deserialize)]
struct DaprErrorBody {
    #[serde(rename = "errorCode", default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

impl DaprErrorBody {
    /// Stores such as Kubernetes surface a missing secret as a 500 with
    /// `ERR_SECRET_GET` and a "not found" message.
    fn is_missing_secret(&self) -> bool {
        self.error_code == "ERR_SECRET_GET"
            && self.message.to_ascii_lowercase().contains("not found")
    }
}

/// HTTP client for the Dapr secrets API.
#[derive(Debug, Clone)]
pub struct DaprTransport {
    client: reqwest::Client,
    base: Url,
    chain: BackendChain,
    probe_timeout: Duration,
}

impl DaprTransport {
    pub fn new(
        endpoint: &str,
        chain: BackendChain,
        request_timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid Dapr endpoint '{}': {}", endpoint, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("Dapr endpoint '{}' is not a base URL", endpoint)));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build Dapr HTTP client: {}", e)))?;

        Ok(Self { client, base, chain, probe_timeout })
    }

    pub fn from_config(config: &TransportConfig, chain: BackendChain) -> Result<Self> {
        Self::new(&config.endpoint, chain, config.request_timeout(), config.probe_timeout())
    }

    fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // the base was checked in `new`, so path segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn secret_url(&self, spec: &BackendSpec, request: &SecretRequest) -> Url {
        let mut url =
            self.endpoint_url(&[API_VERSION, "secrets", spec.id.as_str(), request.name.as_str()]);
        if spec.namespaced {
            url.query_pairs_mut().append_pair(NAMESPACE_PARAM, &request.namespace);
        }
        url
    }

    async fn classify(response: reqwest::Response, key: &str) -> BackendOutcome {
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return BackendOutcome::NotFound;
        }

        if status.is_server_error() {
            if let Ok(body) = response.json::<DaprErrorBody>().await {
                if body.is_missing_secret() {
                    return BackendOutcome::NotFound;
                }
                return BackendOutcome::unreachable(format!(
                    "sidecar returned {} ({})",
                    status, body.error_code
                ));
            }
            return BackendOutcome::unreachable(format!("sidecar returned {}", status));
        }

        if status != StatusCode::OK {
            return BackendOutcome::unexpected(format!("sidecar returned {}", status));
        }

        match response.json::<HashMap<String, SecretString>>().await {
            Ok(mut data) => match data.remove(key) {
                Some(raw) => BackendOutcome::Found(raw),
                None => BackendOutcome::NotFound,
            },
            Err(e) if e.is_timeout() => {
                BackendOutcome::unreachable(format!("timed out reading secret payload: {}", e))
            }
            Err(e) => BackendOutcome::unexpected(format!("invalid secret payload: {}", e)),
        }
    }
}

#[async_trait]
impl BackendTransport for DaprTransport {
    /// # Panics
    ///
    /// Panics if `backend` is not part of the configured chain.
    async fn fetch(&self, backend: &BackendId, request: &SecretRequest) -> BackendOutcome {
        let spec = match self.chain.get(backend.as_str()) {
            Some(spec) => spec,
            None => panic!("fetch called for unconfigured backend '{}'", backend),
        };
        let url = self.secret_url(spec, request);

        debug!(
            backend = %backend,
            secret_name = %request.name,
            namespace = %request.namespace,
            namespaced = spec.namespaced,
            "Fetching secret from Dapr sidecar"
        );

        match self.client.get(url).send().await {
            Ok(response) => Self::classify(response, &request.key).await,
            Err(e) if e.is_timeout() => {
                BackendOutcome::unreachable(format!("request timed out: {}", e))
            }
            Err(e) if e.is_connect() => {
                BackendOutcome::unreachable(format!("cannot connect to sidecar: {}", e))
            }
            Err(e) => BackendOutcome::unreachable(format!("request failed: {}", e)),
        }
    }

    async fn probe(&self) -> Result<()> {
        let url = self.endpoint_url(&[API_VERSION, "metadata"]);
        let response = self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Cannot connect to Dapr sidecar: {}", e)))?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(Error::transport(format!(
                "Dapr sidecar metadata check returned {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &'static str {
        "dapr"
    }
}
