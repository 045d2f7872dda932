//! Asset delivery subsystem.
//!
//! # Data Flow
//! ```text
//! GET {prefix}/{*path}
//!     → handler.rs (raw + extracted path)
//!     → pipeline.rs (limits → normalize → traversal → dotfile → sandbox → policy)
//!     → handler.rs (open file, stream bytes) or JSON rejection
//! ```

pub mod handler;
pub mod pipeline;

pub use pipeline::{AssetPipeline, ClassifiedAsset, Rejection, Stage};
