//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define asset delivery metrics (requests, rejections, bytes, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `uploads_requests_total` (counter): requests by outcome, status
//! - `uploads_rejections_total` (counter): rejections by code, reason
//! - `uploads_bytes_served_total` (counter): bytes announced via Content-Length
//! - `uploads_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - The `metrics` facade is a no-op until an exporter is installed, so
//!   tests and library users pay nothing
//! - Reasons are a closed set of signature names, keeping label cardinality low

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::security::DeliveryError;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_delivered(bytes: u64, start: Instant) {
    counter!("uploads_requests_total", "outcome" => "delivered", "status" => "200").increment(1);
    counter!("uploads_bytes_served_total").increment(bytes);
    histogram!("uploads_request_duration_seconds", "outcome" => "delivered")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rejection(error: &DeliveryError, start: Instant) {
    let status = error.status().as_u16().to_string();
    counter!("uploads_requests_total", "outcome" => "rejected", "status" => status).increment(1);
    counter!("uploads_rejections_total", "code" => error.code(), "reason" => error.reason())
        .increment(1);
    histogram!("uploads_request_duration_seconds", "outcome" => "rejected")
        .record(start.elapsed().as_secs_f64());
}
