//! Metrics collection and exposition.
//!
//! # Metrics
//! - `imvc_renders_total` (counter): finished renders by `outcome`
//! - `imvc_render_duration_seconds` (histogram): render latency by `outcome`
//! - `imvc_unknown_actions_total` (counter): ignored dispatches by `controller`
//! - `imvc_route_table_swaps_total` (counter): hot route reloads

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_render(outcome: &'static str, started: Instant) {
    counter!("imvc_renders_total", "outcome" => outcome).increment(1);
    histogram!("imvc_render_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_unknown_action(controller: &'static str) {
    counter!("imvc_unknown_actions_total", "controller" => controller).increment(1);
}

pub fn record_route_swap() {
    counter!("imvc_route_table_swaps_total").increment(1);
}
