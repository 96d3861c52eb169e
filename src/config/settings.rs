//! # Configuration Settings
//!
//! Defines the configuration structure for the secrets router.

use crate::errors::{Error, Result};
use crate::secrets::{BackendChain, BackendSpec, DecodeRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use validator::Validate;

/// Default secret store used when `AWS_SECRETS_ENABLED` is not false
pub const AWS_SECRETS_MANAGER: &str = "aws-secrets-manager";
pub const KUBERNETES: &str = "kubernetes";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Backend transport (Dapr sidecar) configuration
    #[validate(nested)]
    pub transport: TransportConfig,

    /// Readiness probing configuration
    #[validate(nested)]
    pub readiness: ReadinessConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Secret stores in priority order, highest first
    #[validate(length(min = 1, message = "At least one secret backend must be configured"))]
    pub backends: Vec<BackendSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            transport: TransportConfig::default(),
            readiness: ReadinessConfig::default(),
            observability: ObservabilityConfig::default(),
            backends: default_backends(),
        }
    }
}

/// AWS Secrets Manager first, then the namespace's Kubernetes secrets
pub fn default_backends() -> Vec<BackendSpec> {
    vec![
        BackendSpec::new(AWS_SECRETS_MANAGER, DecodeRule::Plain, false),
        BackendSpec::new(KUBERNETES, DecodeRule::Base64, true),
    ]
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.backends {
            if spec.id.as_str().trim().is_empty() {
                return Err(Error::validation("Secret backend id cannot be empty"));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(Error::validation(format!(
                    "Secret backend '{}' is configured more than once",
                    spec.id
                )));
            }
        }

        if self.transport.probe_timeout() > self.readiness.probe_interval() {
            return Err(Error::validation(
                "Probe timeout cannot be longer than the probe interval",
            ));
        }

        if self.observability.enable_metrics && self.observability.metrics_port == self.server.port
        {
            return Err(Error::validation("Server and metrics ports cannot be the same"));
        }

        Ok(())
    }

    /// Apply the environment variables the router has always honoured.
    ///
    /// These are applied last and override every other source:
    /// `SERVER_PORT`, `DAPR_HTTP_PORT`, `DEBUG_MODE`, `SERVICE_VERSION` and
    /// `AWS_SECRETS_ENABLED` (the AWS store is kept only when it is unset or
    /// `true`, case-insensitive).
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_port("SERVER_PORT", &port)?;
        }

        if let Some(port) = lookup("DAPR_HTTP_PORT") {
            let port = parse_port("DAPR_HTTP_PORT", &port)?;
            self.transport.endpoint = format!("http://localhost:{}", port);
        }

        if lookup("DEBUG_MODE").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            self.observability.log_level = "debug".to_string();
        }

        if let Some(version) = lookup("SERVICE_VERSION") {
            self.observability.service_version = version;
        }

        let aws_enabled = match lookup("AWS_SECRETS_ENABLED") {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => true,
        };
        if !aws_enabled {
            self.backends.retain(|spec| spec.id.as_str() != AWS_SECRETS_MANAGER);
        }

        Ok(())
    }

    /// Freeze the backend list into the chain shared by the engine.
    pub fn backend_chain(&self) -> Result<BackendChain> {
        BackendChain::new(self.backends.clone())
    }

    pub fn backend_ids(&self) -> Vec<&str> {
        self.backends.iter().map(|spec| spec.id.as_str()).collect()
    }
}

fn parse_port(var: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {} '{}': {}", var, value, e)))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dapr sidecar client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL of the sidecar HTTP API
    #[validate(url(message = "Dapr endpoint must be a valid URL"))]
    pub endpoint: String,

    /// Timeout for one secret lookup, in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Request timeout must be between 1 and 300 seconds"
    ))]
    pub request_timeout_seconds: u64,

    /// Timeout for one readiness probe, in milliseconds
    #[validate(range(
        min = 100,
        max = 30000,
        message = "Probe timeout must be between 100 and 30000 milliseconds"
    ))]
    pub probe_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3500".to_string(),
            request_timeout_seconds: 30,
            probe_timeout_ms: 2000,
        }
    }
}

impl TransportConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Readiness monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Delay between probes, in milliseconds
    #[validate(range(
        min = 100,
        max = 300000,
        message = "Probe interval must be between 100 and 300000 milliseconds"
    ))]
    pub probe_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self { probe_interval_ms: 5000 }
    }
}

impl ReadinessConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, used when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Emit logs as JSON lines
    pub json_logging: bool,

    /// Enable the Prometheus exporter
    pub enable_metrics: bool,

    /// Metrics server port (0 = disabled)
    pub metrics_port: u16,

    /// Service name reported by health endpoints and metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Version reported by health endpoints
    #[validate(length(min = 1, message = "Service version cannot be empty"))]
    pub service_version: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            enable_metrics: false,
            metrics_port: 9090,
            service_name: "secrets-router".to_string(),
            service_version: "v0.0.1".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address if metrics are enabled
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }
}
