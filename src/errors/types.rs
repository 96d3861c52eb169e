//! # Error Types
//!
//! Process-level error types for the secrets router using `thiserror`.
//! Secret resolution failures have their own taxonomy in
//! [`crate::secrets::error`]; this type covers configuration, startup and
//! server plumbing.

/// Custom result type for secrets router operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the secrets router
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network transport errors (HTTP listener, sidecar client construction)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error must stop the process before it serves traffic
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::Validation(_))
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_messages("", &errors, &mut fields);
        // HashMap iteration order is unstable; keep messages deterministic
        fields.sort();

        Self::validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

fn collect_validation_messages(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::config("Test configuration error");
        assert!(matches!(error, Error::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::config("empty backend list").is_fatal_at_startup());
        assert!(Error::validation("bad port").is_fatal_at_startup());
        assert!(!Error::transport("bind failed").is_fatal_at_startup());
        assert!(!Error::internal("oops").is_fatal_at_startup());
    }

    #[test]
    fn test_error_conversions() {
        let config_error = config::ConfigError::Message("bad file".to_string());
        let error: Error = config_error.into();
        assert!(matches!(error, Error::Config { source: Some(_), .. }));
    }
}
