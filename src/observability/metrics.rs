//! Metrics collection and exposition.
//!
//! # Metrics
//! - `backend_requests_total` (counter): requests by method, status, route
//! - `backend_request_duration_seconds` (histogram): latency by route
//! - `backend_rate_limited_total` (counter): denials by policy
//! - `backend_csrf_rejected_total` (counter): CSRF rejections by reason
//! - `backend_errors_total` (counter): error responses by class
//! - `backend_emails_total` (counter): email sends by outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Route label uses the matched route pattern; unmatched paths collapse
//!   into one label so cardinality stays bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address. Must run inside the
/// tokio runtime. Failure to bind is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "backend_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "backend_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a rate-limit denial for the named policy.
pub fn record_rate_limited(policy: &str) {
    metrics::counter!("backend_rate_limited_total", "policy" => policy.to_string()).increment(1);
}

/// Record a CSRF rejection.
pub fn record_csrf_rejected(reason: &str) {
    metrics::counter!("backend_csrf_rejected_total", "reason" => reason.to_string()).increment(1);
}

/// Record an error response by taxonomy class.
pub fn record_error(class: &str) {
    metrics::counter!("backend_errors_total", "class" => class.to_string()).increment(1);
}

/// Record an email send outcome ("sent" or "failed").
pub fn record_email(outcome: &str) {
    metrics::counter!("backend_emails_total", "outcome" => outcome.to_string()).increment(1);
}
