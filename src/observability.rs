use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: admission attempts. Labels: outcome (accepted | conflict).
pub const ADMISSIONS_TOTAL: &str = "venued_admissions_total";

/// Histogram: admission decision latency in seconds.
pub const ADMISSION_DURATION_SECONDS: &str = "venued_admission_duration_seconds";

/// Counter: rejected or missing bearer tokens.
pub const AUTH_FAILURES_TOTAL: &str = "venued_auth_failures_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: live venue documents.
pub const VENUES_ACTIVE: &str = "venued_venues_active";

/// Gauge: registered users.
pub const USERS_ACTIVE: &str = "venued_users_active";

/// Histogram: journal group-commit flush duration in seconds.
pub const JOURNAL_FLUSH_DURATION_SECONDS: &str = "venued_journal_flush_duration_seconds";

/// Histogram: journal group-commit batch size (events per flush).
pub const JOURNAL_FLUSH_BATCH_SIZE: &str = "venued_journal_flush_batch_size";

/// Install the Prometheus metrics exporter on the given port. No-op if
/// the port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
