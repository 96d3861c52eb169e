use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::secrets::ResolveError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

/// Callers never learn which backends were tried or why a value failed.
impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound { .. } => ApiError::NotFound("Secret not found".to_string()),
            ResolveError::Normalization { .. } => {
                ApiError::Internal("Secret could not be decoded".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{Attempt, AttemptStatus, DecodeError};
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_hides_backend_topology() {
        let err = ResolveError::NotFound {
            attempts: vec![Attempt {
                backend: "aws-secrets-manager".into(),
                status: AttemptStatus::Unreachable,
            }],
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert!(!body.to_string().contains("aws-secrets-manager"));
    }

    #[tokio::test]
    async fn test_normalization_maps_to_internal_error() {
        let utf8 = String::from_utf8(vec![0xff]).unwrap_err();
        let err = ResolveError::Normalization {
            backend: "kubernetes".into(),
            source: DecodeError::from(utf8),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("kubernetes"));
    }
}
