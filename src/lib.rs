//! Secure static-asset delivery service.
//!
//! Serves uploaded media from a single directory over HTTP while rejecting
//! path traversal, encoding bypasses, dotfile probes and sandbox escapes.

pub mod config;
pub mod delivery;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::ServiceConfig;
pub use delivery::AssetPipeline;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{DeliveryError, StaticRoot};
