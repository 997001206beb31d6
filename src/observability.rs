use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: requests created.
pub const REQUESTS_TOTAL: &str = "valet_requests_total";

/// Counter: successful allocations. Labels: cross_zone.
pub const ALLOCATIONS_TOTAL: &str = "valet_allocations_total";

/// Counter: operations undone via rollback.
pub const ROLLBACKS_TOTAL: &str = "valet_rollbacks_total";

// ── USE metrics (resource state) ────────────────────────────────

/// Gauge: depth of the undo log (allocations not yet undone).
pub const UNDO_DEPTH: &str = "valet_undo_depth";

/// Install the Prometheus metrics exporter on the given port. No-op if
/// port is None; without a recorder the engine's metric calls cost
/// nothing, so library users are unaffected.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
