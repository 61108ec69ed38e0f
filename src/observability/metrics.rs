//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_probe_total` (counter): probes by endpoint, outcome
//! - `rpc_probe_latency_ms` (histogram): successful probe round-trip
//! - `rpc_attempts_total` (counter): single attempts by endpoint, operation, outcome
//! - `rpc_retries_total` (counter): retries by operation
//! - `rpc_failovers_total` (counter): moves to a next endpoint by operation
//! - `rpc_calls_total` (counter): failover calls by operation, outcome
//! - `rpc_call_duration_seconds` (histogram): end-to-end call latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(endpoint: &str, success: bool, latency_ms: u64) {
    let outcome = if success { "success" } else { "failure" };
    counter!("rpc_probe_total", "endpoint" => endpoint.to_string(), "outcome" => outcome)
        .increment(1);
    if success {
        histogram!("rpc_probe_latency_ms", "endpoint" => endpoint.to_string())
            .record(latency_ms as f64);
    }
}

pub fn record_attempt(endpoint: &str, operation: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "rpc_attempts_total",
        "endpoint" => endpoint.to_string(),
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_retries(operation: &str, retries: u32) {
    counter!("rpc_retries_total", "operation" => operation.to_string()).increment(retries as u64);
}

pub fn record_failover(operation: &str) {
    counter!("rpc_failovers_total", "operation" => operation.to_string()).increment(1);
}

/// Record a finished call. `started` is `None` for calls that never ran to completion.
pub fn record_call(operation: &str, outcome: &'static str, started: Option<Instant>) {
    counter!("rpc_calls_total", "operation" => operation.to_string(), "outcome" => outcome)
        .increment(1);
    if let Some(started) = started {
        histogram!("rpc_call_duration_seconds", "operation" => operation.to_string())
            .record(started.elapsed().as_secs_f64());
    }
}
