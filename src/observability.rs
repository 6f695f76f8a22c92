use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "tessera_bookings_created_total";

/// Counter: bookings confirmed.
pub const BOOKINGS_CONFIRMED_TOTAL: &str = "tessera_bookings_confirmed_total";

/// Counter: bookings canceled.
pub const BOOKINGS_CANCELED_TOTAL: &str = "tessera_bookings_canceled_total";

/// Counter: bookings completed by the sweep.
pub const BOOKINGS_COMPLETED_TOTAL: &str = "tessera_bookings_completed_total";

/// Counter: create/reschedule requests rejected for conflicts.
pub const CONFLICTS_REJECTED_TOTAL: &str = "tessera_conflicts_rejected_total";

/// Histogram: availability expansion latency in seconds.
pub const AVAILABILITY_QUERY_DURATION_SECONDS: &str =
    "tessera_availability_query_duration_seconds";

/// Install the Prometheus metrics exporter on the given port. No-op if the
/// port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
