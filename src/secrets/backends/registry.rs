//! Ordered backend chain
//!
//! The priority list of secret stores, validated once at startup and shared
//! read-only by the transport, the normalizer and the resolver for the life
//! of the process.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use super::backend::BackendSpec;
use crate::errors::{Error, Result};

/// Immutable, non-empty, duplicate-free list of backends in priority order.
#[derive(Debug, Clone)]
pub struct BackendChain {
    backends: Arc<[BackendSpec]>,
}

impl BackendChain {
    /// Validate and freeze the priority list.
    ///
    /// An empty list is a configuration error: the process must refuse to
    /// start rather than fail every request.
    pub fn new(backends: Vec<BackendSpec>) -> Result<Self> {
        if backends.is_empty() {
            return Err(Error::config("No secret backends configured; at least one is required"));
        }

        {
            let mut seen = HashSet::with_capacity(backends.len());
            for spec in &backends {
                if spec.id.as_str().trim().is_empty() {
                    return Err(Error::config("Secret backend id cannot be empty"));
                }
                if !seen.insert(spec.id.as_str()) {
                    return Err(Error::config(format!(
                        "Secret backend '{}' is configured more than once",
                        spec.id
                    )));
                }
            }
        }

        for (priority, spec) in backends.iter().enumerate() {
            info!(
                backend = %spec.id,
                priority = priority,
                decode = %spec.decode,
                namespaced = spec.namespaced,
                "Registered secret backend"
            );
        }

        Ok(Self { backends: backends.into() })
    }

    /// Backends in priority order, highest first
    pub fn iter(&self) -> impl Iterator<Item = &BackendSpec> {
        self.backends.iter()
    }

    pub fn get(&self, id: &str) -> Option<&BackendSpec> {
        self.backends.iter().find(|spec| spec.id.as_str() == id)
    }

}
