//! Ordered-fallback secret resolution.
//!
//! Walks the backend chain in priority order, one backend at a time, and
//! returns the first value that is found and decodes. A backend that is down
//! or answers strangely is logged and skipped; it never blocks a healthy
//! lower-priority backend.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::backends::{BackendChain, BackendTransport};
use super::error::{ResolveError, Result};
use super::normalizer::Normalizer;
use super::types::{Attempt, BackendOutcome, ResolvedSecret, SecretRequest};
use crate::observability::MetricsRecorder;

/// Resolution engine shared by every request handler.
///
/// Holds only immutable state, so one instance serves any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct SecretResolver {
    chain: BackendChain,
    transport: Arc<dyn BackendTransport>,
    normalizer: Normalizer,
    metrics: MetricsRecorder,
}

impl SecretResolver {
    pub fn new(chain: BackendChain, transport: Arc<dyn BackendTransport>) -> Self {
        let normalizer = Normalizer::from_chain(&chain);
        Self { chain, transport, normalizer, metrics: MetricsRecorder::new() }
    }

    /// Resolve `request` against the chain.
    ///
    /// Returns [`ResolveError::NotFound`] when no backend produced the secret,
    /// whether they all answered "not found" or some were unreachable, and
    /// [`ResolveError::Normalization`] when the winning value cannot be
    /// decoded. Lower-priority backends are never consulted after a hit.
    pub async fn resolve(&self, request: &SecretRequest) -> Result<ResolvedSecret> {
        let mut attempts = Vec::with_capacity(self.chain.iter().count());

        for spec in self.chain.iter() {
            let outcome = self.transport.fetch(&spec.id, request).await;
            let status = outcome.status();
            self.metrics.record_backend_attempt(spec.id.as_str(), status.as_str());
            attempts.push(Attempt { backend: spec.id.clone(), status });

            match outcome {
                BackendOutcome::Found(raw) => {
                    return match self.normalizer.normalize(&spec.id, &raw) {
                        Ok(value) => {
                            debug!(
                                backend = %spec.id,
                                secret_name = %request.name,
                                namespace = %request.namespace,
                                "Secret resolved"
                            );
                            self.metrics.record_resolution("found");
                            Ok(ResolvedSecret { backend: spec.id.clone(), value, attempts })
                        }
                        Err(source) => {
                            error!(
                                backend = %spec.id,
                                secret_name = %request.name,
                                namespace = %request.namespace,
                                decode = %spec.decode,
                                error = %source,
                                "Secret value could not be decoded"
                            );
                            self.metrics.record_resolution("normalization_error");
                            Err(ResolveError::Normalization { backend: spec.id.clone(), source })
                        }
                    };
                }
                BackendOutcome::NotFound => {
                    debug!(
                        backend = %spec.id,
                        secret_name = %request.name,
                        namespace = %request.namespace,
                        "Secret not found in backend, trying next"
                    );
                }
                BackendOutcome::Unreachable { reason } => {
                    warn!(
                        backend = %spec.id,
                        secret_name = %request.name,
                        namespace = %request.namespace,
                        transport = self.transport.name(),
                        reason = %reason,
                        "Secret backend unreachable, falling through"
                    );
                }
                BackendOutcome::Unexpected { reason } => {
                    warn!(
                        backend = %spec.id,
                        secret_name = %request.name,
                        namespace = %request.namespace,
                        transport = self.transport.name(),
                        outcome = "unexpected",
                        reason = %reason,
                        "Unexpected response from secret backend, falling through"
                    );
                }
            }
        }

        let err = ResolveError::NotFound { attempts };
        if err.all_not_found() {
            self.metrics.record_resolution("not_found");
        } else {
            warn!(
                secret_name = %request.name,
                namespace = %request.namespace,
                failed_backends = ?err.failed_backends(),
                "Secret not resolved while some backends were failing"
            );
            self.metrics.record_resolution("degraded_not_found");
        }
        Err(err)
    }
}
