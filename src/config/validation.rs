//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check the static root and mount prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; the static root's
//!   existence is checked later, when it is canonicalized

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("assets.static_root is not set (use STATIC_ROOT or --static-root)")]
    MissingStaticRoot,

    #[error("assets.static_root must be absolute: {0}")]
    RelativeStaticRoot(String),

    #[error("assets.mount_prefix must start with '/', not end with '/', and contain no '..': {0}")]
    InvalidMountPrefix(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("listener.bind_address is not a socket address: {0}")]
    InvalidBindAddress(String),

    #[error("listener.tls requires both cert_path and key_path")]
    IncompleteTls,
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let root = &config.assets.static_root;
    if root.is_empty() {
        errors.push(ValidationError::MissingStaticRoot);
    } else if !Path::new(root).is_absolute() {
        errors.push(ValidationError::RelativeStaticRoot(root.clone()));
    }

    let prefix = &config.assets.mount_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') || prefix.contains("..") {
        errors.push(ValidationError::InvalidMountPrefix(prefix.clone()));
    }

    if config.assets.max_path_length == 0 {
        errors.push(ValidationError::Zero {
            field: "assets.max_path_length",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::IncompleteTls);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
