//! # REST API Components
//!
//! HTTP surface of the secrets router: secret lookup plus liveness and
//! readiness endpoints.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState, ServiceInfo};
pub use server::start_api_server;
