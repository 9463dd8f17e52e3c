//! Metrics collection and exposition.
//!
//! # Metrics
//! - `accounts_gateway_requests_total` (counter): requests by route, method, status
//! - `accounts_gateway_request_duration_seconds` (histogram): latency by route
//!
//! `route` is the view name, `delegate`, or `none` for routing misses.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(route: &'static str, method: &str, status: u16, start_time: Instant) {
    metrics::counter!(
        "accounts_gateway_requests_total",
        "route" => route,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("accounts_gateway_request_duration_seconds", "route" => route)
        .record(start_time.elapsed().as_secs_f64());
}
