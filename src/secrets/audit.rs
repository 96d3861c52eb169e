//! Secret access auditing.
//!
//! Every resolution, successful or not, produces one [`AuditEvent`]. A
//! resolution abandoned mid-flight (the caller disconnected) is recorded as
//! [`AuditOutcome::Cancelled`] through [`PendingAudit`]. Sinks are
//! fire-and-forget: recording is synchronous and never changes the response.
//!
//! # Security
//!
//! Events carry the secret name and key, the winning backend and the backends
//! that failed. Secret values are NEVER part of an event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::ResolveError;
use super::types::{BackendId, ResolvedSecret, SecretRequest};

/// Final result of an audited resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Found,
    NotFound,
    NormalizationError,
    /// The request was dropped before resolution finished
    Cancelled,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::NormalizationError => "normalization_error",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Dapr app id of the caller, when the sidecar supplied one
    pub caller: Option<String>,
    pub namespace: String,
    pub secret_name: String,
    pub secret_key: String,
    pub outcome: AuditOutcome,
    /// Backend that produced the value, or the one whose value failed to decode
    pub backend: Option<BackendId>,
    pub failed_backends: Vec<BackendId>,
}

impl AuditEvent {
    pub fn from_resolution(
        caller: Option<String>,
        request: &SecretRequest,
        result: &Result<ResolvedSecret, ResolveError>,
    ) -> Self {
        let (outcome, backend, failed_backends) = match result {
            Ok(resolved) => (
                AuditOutcome::Found,
                Some(resolved.backend.clone()),
                resolved.failed_backends().cloned().collect(),
            ),
            Err(err @ ResolveError::NotFound { .. }) => {
                (AuditOutcome::NotFound, None, err.failed_backends().into_iter().cloned().collect())
            }
            Err(ResolveError::Normalization { backend, .. }) => {
                (AuditOutcome::NormalizationError, Some(backend.clone()), Vec::new())
            }
        };

        Self::new(caller, request, outcome, backend, failed_backends)
    }

    /// Event for a resolution that never completed
    pub fn cancelled(caller: Option<String>, request: &SecretRequest) -> Self {
        Self::new(caller, request, AuditOutcome::Cancelled, None, Vec::new())
    }

    fn new(
        caller: Option<String>,
        request: &SecretRequest,
        outcome: AuditOutcome,
        backend: Option<BackendId>,
        failed_backends: Vec<BackendId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            caller,
            namespace: request.namespace.clone(),
            secret_name: request.name.clone(),
            secret_key: request.key.clone(),
            outcome,
            backend,
            failed_backends,
        }
    }
}

/// Audit record owed for a resolution in flight.
///
/// Call [`PendingAudit::complete`] with the result. If it is dropped first,
/// a `Cancelled` event is recorded instead, so a disconnected caller still
/// leaves a trace.
#[derive(Debug)]
pub struct PendingAudit {
    sink: Arc<dyn AuditSink>,
    caller: Option<String>,
    request: SecretRequest,
    completed: bool,
}

impl PendingAudit {
    pub fn new(sink: Arc<dyn AuditSink>, caller: Option<String>, request: &SecretRequest) -> Self {
        Self { sink, caller, request: request.clone(), completed: false }
    }

    pub fn complete(mut self, result: &Result<ResolvedSecret, ResolveError>) {
        self.completed = true;
        let event = AuditEvent::from_resolution(self.caller.take(), &self.request, result);
        self.sink.record(&event);
    }
}

impl Drop for PendingAudit {
    fn drop(&mut self) {
        if !self.completed {
            self.sink.record(&AuditEvent::cancelled(self.caller.take(), &self.request));
        }
    }
}

/// Destination for audit events.
///
/// Implementations must not block and must swallow their own failures.
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    fn record(&self, event: &AuditEvent);
}

/// Writes audit events as structured logs on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let failed_backends: Vec<&str> =
            event.failed_backends.iter().map(|b| b.as_str()).collect();

        tracing::info!(
            target: "audit",
            event_id = %event.id,
            timestamp = %event.timestamp.to_rfc3339(),
            caller = event.caller.as_deref().unwrap_or("unknown"),
            namespace = %event.namespace,
            secret_name = %event.secret_name,
            secret_key = %event.secret_key,
            outcome = event.outcome.as_str(),
            backend = event.backend.as_ref().map(|b| b.as_str()).unwrap_or("none"),
            failed_backends = ?failed_backends,
            "secrets.get"
        );
    }
}
