//! # Metrics Collection
//!
//! Prometheus metrics for secret resolution and transport readiness. The
//! `metrics` macros are no-ops until [`init_metrics`] installs the exporter,
//! so recording is always safe to call.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use ::tracing::{info, warn};
use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Metrics recorder that tracks application metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record one call to a backend and how it was classified
    pub fn record_backend_attempt(&self, backend: &str, outcome: &str) {
        let labels = [("backend", backend.to_string()), ("outcome", outcome.to_string())];
        counter!("secret_backend_attempts_total", &labels).increment(1);
    }

    /// Record the final result of a resolution
    pub fn record_resolution(&self, result: &str) {
        let labels = [("result", result.to_string())];
        counter!("secret_resolutions_total", &labels).increment(1);
    }

    /// Update the transport readiness gauge (1 = connected)
    pub fn set_transport_ready(&self, ready: bool) {
        gauge!("backend_transport_ready").set(if ready { 1.0 } else { 0.0 });
    }

    pub fn register_secret_metrics(&self) {
        describe_counter!(
            "secret_backend_attempts_total",
            Unit::Count,
            "Backend lookups by backend and classified outcome"
        );
        describe_counter!(
            "secret_resolutions_total",
            Unit::Count,
            "Secret resolutions by final result"
        );
        describe_gauge!(
            "backend_transport_ready",
            Unit::Count,
            "Whether the backend transport answered its last readiness probe"
        );
    }
}

/// Initialize metrics collection and Prometheus exporter
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        Error::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| Error::config(format!("Failed to initialize metrics exporter: {}", e)))?;

    MetricsRecorder::new().register_secret_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}
