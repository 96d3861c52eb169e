//! Error types for secret resolution.

use thiserror::Error;

use super::types::{Attempt, AttemptStatus, BackendId};

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// A raw value that exists but cannot be turned into text.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("value is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("decoded value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors a resolution can end with.
///
/// Individual backend failures never appear here on their own; they are
/// recovered by falling through to the next backend and only show up in the
/// attempt list carried by [`ResolveError::NotFound`].
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Every configured backend was consulted and none produced the secret.
    #[error("Secret not found")]
    NotFound { attempts: Vec<Attempt> },

    /// A backend returned the secret but its value could not be decoded.
    #[error("Secret from backend '{backend}' could not be decoded: {source}")]
    Normalization {
        backend: BackendId,
        #[source]
        source: DecodeError,
    },
}

impl ResolveError {
    /// True only when every backend answered "not found".
    ///
    /// A `NotFound` produced while some backend was unreachable is an
    /// escalated condition for operators, even though callers see the same 404.
    pub fn all_not_found(&self) -> bool {
        match self {
            ResolveError::NotFound { attempts } => {
                attempts.iter().all(|a| a.status == AttemptStatus::NotFound)
            }
            ResolveError::Normalization { .. } => false,
        }
    }

    /// Backends that failed during this resolution
    pub fn failed_backends(&self) -> Vec<&BackendId> {
        match self {
            ResolveError::NotFound { attempts } => {
                attempts.iter().filter(|a| a.status.is_failure()).map(|a| &a.backend).collect()
            }
            ResolveError::Normalization { backend, .. } => vec![backend],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(backend: &str, status: AttemptStatus) -> Attempt {
        Attempt { backend: backend.into(), status }
    }

    #[test]
    fn test_not_found_display_hides_backends() {
        let err = ResolveError::NotFound {
            attempts: vec![attempt("aws-secrets-manager", AttemptStatus::Unreachable)],
        };
        assert_eq!(err.to_string(), "Secret not found");
    }

    #[test]
    fn test_all_not_found_distinguishes_unreachable() {
        let genuine = ResolveError::NotFound {
            attempts: vec![
                attempt("aws-secrets-manager", AttemptStatus::NotFound),
                attempt("kubernetes", AttemptStatus::NotFound),
            ],
        };
        assert!(genuine.all_not_found());
        assert!(genuine.failed_backends().is_empty());

        let degraded = ResolveError::NotFound {
            attempts: vec![
                attempt("aws-secrets-manager", AttemptStatus::Unreachable),
                attempt("kubernetes", AttemptStatus::NotFound),
            ],
        };
        assert!(!degraded.all_not_found());
        assert_eq!(degraded.failed_backends(), vec![&BackendId::new("aws-secrets-manager")]);
    }

    #[test]
    fn test_decode_error_sources() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.decode("***").unwrap_err();
        let err = ResolveError::Normalization {
            backend: "kubernetes".into(),
            source: DecodeError::from(b64),
        };
        assert!(err.to_string().contains("kubernetes"));
        assert!(!err.all_not_found());

        let utf8 = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(DecodeError::from(utf8), DecodeError::InvalidUtf8(_)));
    }
}
