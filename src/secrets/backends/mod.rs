//! Secret backend transport and configured stores
//!
//! The router never talks to a secret store directly. Every lookup goes
//! through a [`BackendTransport`] (the Dapr sidecar in production) naming one
//! store from the ordered [`BackendChain`].
//!
//! ## Transports
//!
//! - **Dapr**: HTTP secrets API of the local sidecar
//! - **Memory**: in-process stand-in for tests and local development

pub mod backend;
pub mod dapr;
pub mod memory;
pub mod registry;

pub use backend::{BackendSpec, BackendTransport};
pub use dapr::DaprTransport;
pub use memory::InMemoryTransport;
pub use registry::BackendChain;
