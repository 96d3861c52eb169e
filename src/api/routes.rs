use std::sync::Arc;

use axum::{extract::Request, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::observability::ReadinessHandle;
use crate::request_span;
use crate::secrets::{AuditSink, SecretResolver, TracingAuditSink};

use super::handlers::{get_secret_handler, healthz_handler, readyz_handler};

/// Static identity reported by the health endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into() }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub resolver: Arc<SecretResolver>,
    pub readiness: ReadinessHandle,
    pub audit: Arc<dyn AuditSink>,
    pub service: Arc<ServiceInfo>,
}

impl ApiState {
    /// State with audit events written to the `audit` log target
    pub fn new(resolver: SecretResolver, readiness: ReadinessHandle, service: ServiceInfo) -> Self {
        Self {
            resolver: Arc::new(resolver),
            readiness,
            audit: Arc::new(TracingAuditSink),
            service: Arc::new(service),
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/secrets/{name}/{key}", get(get_secret_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            request_span!(request.method(), request.uri().path())
        }))
}
