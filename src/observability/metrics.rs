//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint and status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint. Failure is
/// logged but does not prevent the gateway from serving.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(error) => tracing::error!(%error, "Failed to install Prometheus exporter"),
    }
}

/// Axum middleware recording one observation per request.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request.uri().path().to_owned();

    let response = next.run(request).await;

    record_request(&endpoint, response.status().as_u16(), start);
    response
}

pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "endpoint" => endpoint.to_owned()
    )
    .record(start.elapsed().as_secs_f64());
}
