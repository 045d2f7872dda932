//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the static root.
pub const STATIC_ROOT_ENV: &str = "STATIC_ROOT";
/// Environment variable overriding the bind address.
pub const BIND_ADDRESS_ENV: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides from `lookup` (normally `std::env::var`).
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(root) = lookup(STATIC_ROOT_ENV).filter(|v| !v.is_empty()) {
        config.assets.static_root = root;
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV).filter(|v| !v.is_empty()) {
        config.listener.bind_address = addr;
    }
}

/// Load, override from the process environment, then from `overrides`
/// (command-line flags), and validate.
pub fn load_config<O>(path: Option<&Path>, overrides: O) -> Result<ServiceConfig, ConfigError>
where
    O: FnOnce(&mut ServiceConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok());
    overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
