//! Secret lookup endpoint
//!
//! `GET /secrets/{name}/{key}?namespace={namespace}`

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::secrets::{PendingAudit, SecretRequest};

/// Header the Dapr sidecar sets to the calling app's id
pub const CALLER_APP_ID_HEADER: &str = "dapr-caller-app-id";

#[derive(Debug, Clone, Deserialize)]
pub struct SecretQuery {
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretResponse {
    pub backend: String,
    pub secret_name: String,
    pub secret_key: String,
    pub value: String,
}

pub async fn get_secret_handler(
    State(state): State<ApiState>,
    Path((name, key)): Path<(String, String)>,
    Query(query): Query<SecretQuery>,
    headers: HeaderMap,
) -> Result<Json<SecretResponse>, ApiError> {
    let namespace = match query.namespace {
        Some(ns) if !ns.trim().is_empty() => ns,
        _ => {
            return Err(ApiError::BadRequest(
                "The 'namespace' query parameter is required".to_string(),
            ))
        }
    };
    if name.trim().is_empty() || key.trim().is_empty() {
        return Err(ApiError::BadRequest("Secret name and key cannot be empty".to_string()));
    }

    let caller = headers
        .get(CALLER_APP_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let request = SecretRequest::new(namespace, name, key);
    // records a cancellation if this future is dropped mid-resolution
    let audit = PendingAudit::new(state.audit.clone(), caller, &request);
    let result = state.resolver.resolve(&request).await;
    audit.complete(&result);

    let resolved = result?;
    Ok(Json(SecretResponse {
        backend: resolved.backend.to_string(),
        secret_name: request.name,
        secret_key: request.key,
        value: resolved.value.expose_secret().to_string(),
    }))
}
