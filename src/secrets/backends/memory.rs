//! In-memory backend transport
//!
//! Stands in for the Dapr sidecar in tests and local development. Each
//! backend can be switched between answering normally, being unreachable and
//! returning an unexpected response, and the probe result can be flipped at
//! runtime to drive the readiness state machine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::backend::BackendTransport;
use crate::errors::{Error, Result};
use crate::secrets::types::{BackendId, BackendOutcome, SecretRequest, SecretString};

/// (backend, namespace, secret name, key); `None` namespace matches any
type EntryKey = (BackendId, Option<String>, String, String);

#[derive(Debug, Default)]
struct State {
    entries: HashMap<EntryKey, SecretString>,
    failures: HashMap<BackendId, BackendOutcome>,
    calls: HashMap<BackendId, usize>,
}

#[derive(Debug)]
pub struct InMemoryTransport {
    state: Mutex<State>,
    healthy: AtomicBool,
    latency: Option<Duration>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransport {
    /// Empty transport whose probe succeeds
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()), healthy: AtomicBool::new(true), latency: None }
    }

    /// Store a raw value visible regardless of the request namespace.
    pub fn with_secret(
        self,
        backend: &str,
        name: &str,
        key: &str,
        raw: impl Into<SecretString>,
    ) -> Self {
        self.insert((backend.into(), None, name.to_string(), key.to_string()), raw.into());
        self
    }

    /// Store a raw value visible only to requests for `namespace`.
    pub fn with_namespaced_secret(
        self,
        backend: &str,
        namespace: &str,
        name: &str,
        key: &str,
        raw: impl Into<SecretString>,
    ) -> Self {
        self.insert(
            (backend.into(), Some(namespace.to_string()), name.to_string(), key.to_string()),
            raw.into(),
        );
        self
    }

    /// Delay every fetch, to simulate a slow transport.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_unreachable(&self, backend: &str) {
        self.lock()
            .failures
            .insert(backend.into(), BackendOutcome::unreachable("connection refused"));
    }

    pub fn set_unexpected(&self, backend: &str) {
        self.lock()
            .failures
            .insert(backend.into(), BackendOutcome::unexpected("sidecar returned 418"));
    }

    /// Clear any failure mode configured for `backend`.
    pub fn restore(&self, backend: &str) {
        self.lock().failures.remove(backend);
    }

    /// Control the result of [`BackendTransport::probe`].
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Number of `fetch` calls made against `backend` so far
    pub fn calls(&self, backend: &str) -> usize {
        self.lock().calls.get(backend).copied().unwrap_or(0)
    }

    fn insert(&self, key: EntryKey, raw: SecretString) {
        self.lock().entries.insert(key, raw);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // poisoning only means another caller panicked mid-update of a plain map
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BackendTransport for InMemoryTransport {
    async fn fetch(&self, backend: &BackendId, request: &SecretRequest) -> BackendOutcome {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        *state.calls.entry(backend.clone()).or_insert(0) += 1;

        if let Some(failure) = state.failures.get(backend) {
            return failure.clone();
        }

        let scoped = (
            backend.clone(),
            Some(request.namespace.clone()),
            request.name.clone(),
            request.key.clone(),
        );
        let unscoped = (backend.clone(), None, request.name.clone(), request.key.clone());

        match state.entries.get(&scoped).or_else(|| state.entries.get(&unscoped)) {
            Some(raw) => BackendOutcome::Found(raw.clone()),
            None => BackendOutcome::NotFound,
        }
    }

    async fn probe(&self) -> Result<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::transport("Cannot connect to in-memory transport"))
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
