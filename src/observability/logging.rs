//! # Structured Logging
//!
//! Subscriber setup and logging helpers built on the tracing ecosystem.
//!
//! `RUST_LOG` always wins over the configured level. With `json_logging`
//! enabled every event, including the `audit` target, is emitted as one JSON
//! object per line for log shippers.

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/secrets/db-creds/password");
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json_logging {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::internal(format!("Failed to initialize logging: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        dapr_endpoint = %config.transport.endpoint,
        request_timeout_seconds = config.transport.request_timeout_seconds,
        probe_interval_ms = config.readiness.probe_interval_ms,
        backends = ?config.backend_ids(),
        metrics_enabled = %config.observability.enable_metrics,
        log_level = %config.observability.log_level,
        version = %config.observability.service_version,
        "Secrets router configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_request_span_is_named() {
        let span = request_span!("GET", "/secrets/db-creds/password");
        if let Some(metadata) = span.metadata() {
            assert_eq!(metadata.name(), "http_request");
        }
    }

    #[test]
    #[traced_test]
    fn test_log_config_info() {
        let config = AppConfig::default();
        log_config_info(&config);
        assert!(logs_contain("Secrets router configuration"));
        assert!(logs_contain("kubernetes"));
    }
}
