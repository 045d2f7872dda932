//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming asset path:
//!     → limits.rs (bound raw length)
//!     → normalize.rs (collect raw/normalized/decoded forms)
//!     → traversal.rs (signature scan over every form)
//!     → dotfile.rs (hidden final segment)
//!     → sandbox.rs (canonicalize + root prefix check)
//!     → headers.rs (disposition, content type, security headers)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: every representation of the path is inspected
//! - Fail closed: reject on any security check failure
//! - The sandbox prefix check is the final backstop, never skipped
//! - No trust in client input

pub mod dotfile;
pub mod error;
pub mod headers;
pub mod limits;
pub mod normalize;
pub mod sandbox;
pub mod traversal;

pub use error::DeliveryError;
pub use headers::{ContentPolicy, Disposition};
pub use normalize::RequestPath;
pub use sandbox::{ResolvedPath, StaticRoot, StaticRootError};
pub use traversal::TraversalDetector;
