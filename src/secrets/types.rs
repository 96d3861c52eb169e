//! Request, outcome and result types for secret resolution.
//!
//! Secret values travel as [`SecretString`] everywhere inside the resolution
//! path so they cannot leak through `Debug`, `Display`, serialization, or
//! structured log fields. Only the HTTP response builder exposes them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// - Debug output shows `SecretString([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization outputs `"[REDACTED]"`
/// - Memory is zeroed when dropped
///
/// The value is only reachable through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of one configured secret store (the Dapr component name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BackendId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BackendId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BackendId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single inbound lookup. All three fields are mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

impl SecretRequest {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self { namespace: namespace.into(), name: name.into(), key: key.into() }
    }
}

/// Classified result of one call to the backend transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutcome {
    /// The store returned a raw (not yet normalized) value for the key
    Found(SecretString),
    /// The store answered and does not hold the secret or the key
    NotFound,
    /// Connection failure, timeout, or a 5xx from the transport
    Unreachable { reason: String },
    /// Any other response the adapter could not interpret
    Unexpected { reason: String },
}

impl BackendOutcome {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable { reason: reason.into() }
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected { reason: reason.into() }
    }

    pub fn status(&self) -> AttemptStatus {
        match self {
            BackendOutcome::Found(_) => AttemptStatus::Found,
            BackendOutcome::NotFound => AttemptStatus::NotFound,
            BackendOutcome::Unreachable { .. } => AttemptStatus::Unreachable,
            BackendOutcome::Unexpected { .. } => AttemptStatus::Unexpected,
        }
    }
}

/// Value-free label for a [`BackendOutcome`], used in logs, metrics and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Found,
    NotFound,
    Unreachable,
    Unexpected,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Unreachable => "unreachable",
            Self::Unexpected => "unexpected",
        }
    }

    /// Whether the backend failed to give a definitive answer
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unreachable | Self::Unexpected)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend attempt within a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub backend: BackendId,
    pub status: AttemptStatus,
}

/// A successful resolution: exactly one winning backend and its normalized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub backend: BackendId,
    pub value: SecretString,
    /// Every backend consulted, in priority order, ending with the winner
    pub attempts: Vec<Attempt>,
}

impl ResolvedSecret {
    /// Higher-priority backends that failed before the winner answered
    pub fn failed_backends(&self) -> impl Iterator<Item = &BackendId> {
        self.attempts.iter().filter(|a| a.status.is_failure()).map(|a| &a.backend)
    }
}
