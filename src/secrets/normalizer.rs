//! Per-backend value normalization.
//!
//! Stores hand back values in different shapes: the Kubernetes store
//! transports secret data base64-encoded while managed cloud stores return
//! plain text. The rule table built here is the only place those differences
//! are known; the resolver never branches on backend kind.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::backends::BackendChain;
use super::error::DecodeError;
use super::types::{BackendId, SecretString};

/// How a backend's raw value is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeRule {
    /// Standard-alphabet, padded base64 carrying UTF-8 text
    Base64,
    /// Value is already plain text
    #[default]
    Plain,
}

impl DecodeRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Plain => "plain",
        }
    }

    /// Apply this rule to a raw value.
    ///
    /// Surrounding ASCII whitespace is ignored for base64 (stores and
    /// manifests commonly append a trailing newline).
    pub fn apply(&self, raw: &SecretString) -> Result<SecretString, DecodeError> {
        match self {
            DecodeRule::Plain => Ok(raw.clone()),
            DecodeRule::Base64 => {
                let encoded = raw.expose_secret().trim_matches(|c: char| c.is_ascii_whitespace());
                let bytes = STANDARD.decode(encoded)?;
                Ok(SecretString::new(String::from_utf8(bytes)?))
            }
        }
    }
}

impl std::fmt::Display for DecodeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static rule table keyed by backend id.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: HashMap<BackendId, DecodeRule>,
}

impl Normalizer {
    pub fn from_chain(chain: &BackendChain) -> Self {
        let rules = chain.iter().map(|spec| (spec.id.clone(), spec.decode)).collect();
        Self { rules }
    }

    /// The rule configured for `backend`.
    ///
    /// # Panics
    ///
    /// Panics if `backend` is not part of the chain this normalizer was built
    /// from. Backend ids only ever come from that same chain.
    pub fn rule_for(&self, backend: &BackendId) -> DecodeRule {
        match self.rules.get(backend) {
            Some(rule) => *rule,
            None => panic!("no decode rule for unconfigured backend '{}'", backend),
        }
    }

    pub fn normalize(
        &self,
        backend: &BackendId,
        raw: &SecretString,
    ) -> Result<SecretString, DecodeError> {
        self.rule_for(backend).apply(raw)
    }
}
