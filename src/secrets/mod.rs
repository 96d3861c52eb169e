//! Secret resolution engine.
//!
//! Applications ask for a secret by namespace, name and key. The router
//! tries each configured secret store in priority order through the backend
//! transport and hands back the first value it finds, decoded according to
//! that store's rule.
//!
//! # Architecture
//!
//! - [`backends`]: the transport seam ([`BackendTransport`]) and the ordered
//!   [`BackendChain`] of configured stores
//! - [`normalizer`]: per-store decoding ([`DecodeRule`])
//! - [`resolver`]: the ordered-fallback algorithm ([`SecretResolver`])
//! - [`audit`]: one audit record per resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use secrets_router::secrets::{
//!     BackendChain, BackendSpec, DecodeRule, InMemoryTransport, SecretRequest, SecretResolver,
//! };
//!
//! let chain = BackendChain::new(vec![
//!     BackendSpec::new("aws-secrets-manager", DecodeRule::Plain, false),
//!     BackendSpec::new("kubernetes", DecodeRule::Base64, true),
//! ])?;
//! let transport = Arc::new(InMemoryTransport::new());
//! let resolver = SecretResolver::new(chain, transport);
//!
//! let secret = resolver.resolve(&SecretRequest::new("production", "db-creds", "password")).await?;
//! ```
//!
//! # Security
//!
//! Values are wrapped in [`SecretString`] from the moment the transport
//! returns them, so they never appear in logs, audit records or debug output.

pub mod audit;
pub mod backends;
pub mod error;
pub mod normalizer;
pub mod resolver;
pub mod types;

pub use audit::{AuditEvent, AuditOutcome, AuditSink, PendingAudit, TracingAuditSink};
pub use backends::{BackendChain, BackendSpec, BackendTransport, DaprTransport, InMemoryTransport};
pub use error::{DecodeError, ResolveError};
pub use normalizer::{DecodeRule, Normalizer};
pub use resolver::SecretResolver;
pub use types::{
    Attempt, AttemptStatus, BackendId, BackendOutcome, ResolvedSecret, SecretRequest, SecretString,
};
