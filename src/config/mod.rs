//! # Configuration Management
//!
//! Layered configuration for the secrets router, lowest precedence first:
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. An optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. `SECRETS_ROUTER__*` environment variables, `__` separating nesting
//!    levels (`SECRETS_ROUTER__SERVER__PORT=9000`)
//! 4. The legacy variables handled by [`AppConfig::apply_legacy_env`]
//!
//! The result is validated before it is returned; any failure is fatal at
//! startup.

pub mod settings;

pub use settings::{
    default_backends, AppConfig, ObservabilityConfig, ReadinessConfig, ServerConfig,
    TransportConfig, AWS_SECRETS_MANAGER, KUBERNETES,
};

use crate::errors::{Error, Result};
use config::{Config, Environment, File};
use std::path::Path;

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "SECRETS_ROUTER";

/// Load, layer and validate the configuration.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = load_layers(path)?;
    config.apply_legacy_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

fn load_layers(path: Option<&Path>) -> Result<AppConfig> {
    let mut defaults = serde_json::to_value(AppConfig::default())
        .map_err(|e| Error::internal(format!("Failed to serialize default config: {}", e)))?;
    // the backend list is replaced as a whole, never merged entry by entry
    if let Some(map) = defaults.as_object_mut() {
        map.remove("backends");
    }

    let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);

    if let Some(path) = path {
        if !path.exists() {
            return Err(Error::config(format!("Config file not found: {}", path.display())));
        }
        builder = builder.add_source(File::from(path));
    }

    // values stay strings here; typed fields are parsed during deserialization
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(config)
}
