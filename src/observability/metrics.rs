//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_events_queued_total` (counter): events queued for writing, by button
//! - `bridge_events_dropped_total` (counter): events refused, by button
//! - `bridge_lifecycle_state` (gauge): 0=not started, 1=running,
//!   2=shutting down, 3=stopped
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::LifecycleState;
use crate::wire::ButtonId;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_event_queued(button: ButtonId) {
    ::metrics::counter!("bridge_events_queued_total", "button" => button.to_string()).increment(1);
}

pub fn record_event_dropped(button: ButtonId) {
    ::metrics::counter!("bridge_events_dropped_total", "button" => button.to_string()).increment(1);
}

pub fn record_lifecycle_state(state: LifecycleState) {
    ::metrics::gauge!("bridge_lifecycle_state").set(state as u8 as f64);
}
