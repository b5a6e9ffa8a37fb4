//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): dispatched requests by method, route,
//!   status (synthesized 401/403/405/500 responses included)
//! - `gate_request_duration_seconds` (histogram): dispatch latency by
//!   method and route (includes the 401/403 mitigation delay)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(error) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::error!(error = %error, "Failed to install metrics exporter");
    } else {
        tracing::info!(address = %addr, "Metrics exporter listening");
    }
}

/// Record one dispatched request.
pub fn record_dispatch(method: &str, route: &str, status: u16, start: Instant) {
    let latency = start.elapsed().as_secs_f64();
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gate_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(latency);
}
