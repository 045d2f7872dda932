//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line
//! - Rejection reasons are logged, never returned to clients

pub mod logging;
pub mod metrics;
