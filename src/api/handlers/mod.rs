pub mod health;
pub mod secrets;

pub use health::{healthz_handler, readyz_handler, HealthResponse, ReadinessResponse};
pub use secrets::{get_secret_handler, SecretQuery, SecretResponse, CALLER_APP_ID_HEADER};
