//! Liveness and readiness endpoints
//!
//! `/healthz` answers while the process is alive and never looks at the
//! backend transport. `/readyz` reports the state kept by the readiness
//! monitor and is what the orchestrator should gate traffic on.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::routes::ApiState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub service: String,
    pub dapr_sidecar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn healthz_handler(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: state.service.name.clone(),
            version: state.service.version.clone(),
        }),
    )
}

pub async fn readyz_handler(
    State(state): State<ApiState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    if state.readiness.is_ready() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                service: state.service.name.clone(),
                dapr_sidecar: "connected".to_string(),
                version: Some(state.service.version.clone()),
                last_checked_at: state.readiness.last_checked_at(),
                error: None,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                service: state.service.name.clone(),
                dapr_sidecar: "disconnected".to_string(),
                version: None,
                last_checked_at: state.readiness.last_checked_at(),
                error: Some("Cannot connect to Dapr sidecar".to_string()),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::ServiceInfo;
    use crate::observability::ReadinessMonitor;
    use crate::secrets::{BackendChain, BackendSpec, DecodeRule, InMemoryTransport, SecretResolver};
    use std::sync::Arc;
    use std::time::Duration;

    fn state() -> (ApiState, ReadinessMonitor, Arc<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        let chain =
            BackendChain::new(vec![BackendSpec::new("kubernetes", DecodeRule::Base64, true)])
                .unwrap();
        let monitor = ReadinessMonitor::new(transport.clone(), Duration::from_secs(5));
        let state = ApiState::new(
            SecretResolver::new(chain, transport.clone()),
            monitor.handle(),
            ServiceInfo::new("secrets-router", "v0.0.1"),
        );
        (state, monitor, transport)
    }

    #[tokio::test]
    async fn test_healthz_ignores_readiness() {
        let (state, _monitor, _transport) = state();
        let (status, Json(body)) = healthz_handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, "v0.0.1");
    }

    #[tokio::test]
    async fn test_readyz_follows_monitor() {
        let (state, monitor, transport) = state();

        let (status, Json(body)) = readyz_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.dapr_sidecar, "disconnected");
        assert!(body.last_checked_at.is_none());

        monitor.probe_once().await;
        let (status, Json(body)) = readyz_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ready");
        assert!(body.last_checked_at.is_some());

        transport.set_healthy(false);
        monitor.probe_once().await;
        let (status, Json(body)) = readyz_handler(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.as_deref(), Some("Cannot connect to Dapr sidecar"));
    }
}
