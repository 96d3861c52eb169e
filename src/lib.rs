//! # Secrets Router
//!
//! A namespace-scoped secret resolution proxy. Applications ask one HTTP
//! endpoint for a secret by namespace, name and key; the router resolves it
//! through the local Dapr sidecar against an ordered list of secret stores
//! and returns the first match, decoded.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API → Secret Resolver → Backend Transport (Dapr sidecar) → Secret Stores
//!               ↓                     ↑
//!           Normalizer        Readiness Monitor
//! ```
//!
//! ## Core Components
//!
//! - **HTTP API**: Axum server exposing `/secrets/{name}/{key}`, `/healthz`, `/readyz`
//! - **Secret Resolver**: ordered fallback across configured stores, first match wins
//! - **Normalizer**: per-store decoding (base64 for Kubernetes, plain text otherwise)
//! - **Backend Transport**: one HTTP call per lookup to the Dapr secrets API
//! - **Readiness Monitor**: background prober owning the readiness flag
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use secrets_router::{
//!     api::{build_router, ApiState, ServiceInfo},
//!     config::AppConfig,
//!     observability::ReadinessMonitor,
//!     secrets::{DaprTransport, SecretResolver},
//!     Result,
//! };
//!
//! fn router() -> Result<axum::Router> {
//!     let config = AppConfig::default();
//!     let chain = config.backend_chain()?;
//!     let transport = Arc::new(DaprTransport::from_config(&config.transport, chain.clone())?);
//!     let monitor = ReadinessMonitor::new(transport.clone(), config.readiness.probe_interval());
//!     let state = ApiState::new(
//!         SecretResolver::new(chain, transport),
//!         monitor.handle(),
//!         ServiceInfo::new("secrets-router", "v0.0.1"),
//!     );
//!     Ok(build_router(state))
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
