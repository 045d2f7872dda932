//! Startup orchestration.
//!
//! # Responsibilities
//! - Canonicalize the static root
//! - Compile the traversal signature table
//! - Assemble the asset pipeline and HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Everything the pipeline needs is built here once and never mutated

use thiserror::Error;

use crate::config::ServiceConfig;
use crate::delivery::AssetPipeline;
use crate::http::HttpServer;
use crate::security::{ContentPolicy, StaticRoot, StaticRootError, TraversalDetector};

/// Fatal errors while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    StaticRoot(#[from] StaticRootError),

    #[error("failed to compile traversal signatures: {0}")]
    Signatures(#[from] regex::Error),

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the pipeline described by `config`.
pub fn build_pipeline(config: &ServiceConfig) -> Result<AssetPipeline, StartupError> {
    let root = StaticRoot::new(&config.assets.static_root)?;
    let detector = TraversalDetector::new()?;
    let policy = ContentPolicy::new(config.assets.cache_max_age_secs);

    tracing::info!(
        static_root = %root.as_path().display(),
        mount_prefix = %config.assets.mount_prefix,
        max_path_length = config.assets.max_path_length,
        "Asset pipeline ready"
    );

    Ok(AssetPipeline::new(
        root,
        detector,
        policy,
        config.assets.max_path_length,
    ))
}

/// Build the server for `config`.
pub fn build_server(config: ServiceConfig) -> Result<HttpServer, StartupError> {
    let pipeline = build_pipeline(&config)?;
    Ok(HttpServer::new(config, pipeline))
}
