//! Secret backend trait and types
//!
//! Defines the narrow interface to the backend transport process (the Dapr
//! sidecar) and the static description of each configured secret store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::secrets::normalizer::DecodeRule;
use crate::secrets::types::{BackendId, BackendOutcome, SecretRequest};

/// Static description of one configured secret store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSpec {
    /// Component name of the store in the transport
    pub id: BackendId,

    /// How values returned by this store are decoded
    #[serde(default)]
    pub decode: DecodeRule,

    /// Whether lookups are scoped to the request namespace
    #[serde(default)]
    pub namespaced: bool,
}

impl BackendSpec {
    pub fn new(id: impl Into<BackendId>, decode: DecodeRule, namespaced: bool) -> Self {
        Self { id: id.into(), decode, namespaced }
    }
}

/// Trait for the backend transport
///
/// Implementations perform exactly one call per `fetch`, with no retries and
/// no caching, and classify whatever happened into a [`BackendOutcome`].
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait BackendTransport: Send + Sync + std::fmt::Debug {
    /// Look up `request.key` inside secret `request.name` in store `backend`.
    async fn fetch(&self, backend: &BackendId, request: &SecretRequest) -> BackendOutcome;

    /// Check that the transport process itself is reachable.
    ///
    /// Returns Ok(()) if the transport answered, Err otherwise. Says nothing
    /// about whether any particular secret exists.
    async fn probe(&self) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
