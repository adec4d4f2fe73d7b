use std::sync::OnceLock;

use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

/// Counter, labelled by `endpoint` and `outcome`.
pub const QUERIES_TOTAL: &str = "hr_queries_total";
/// Histogram of returned candidates per query.
pub const QUERY_RESULTS: &str = "hr_query_results";
/// Counter, labelled by `outcome`.
pub const INDEX_RELOADS_TOTAL: &str = "hr_index_reloads_total";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Parse a port value; empty, malformed or zero means "disabled".
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port > 0)
}

fn describe_metrics() {
    describe_counter!(QUERIES_TOTAL, "Queries served, by endpoint and outcome");
    describe_histogram!(QUERY_RESULTS, Unit::Count, "Candidates returned per query");
    describe_counter!(INDEX_RELOADS_TOTAL, "Corpus index rebuilds, by outcome");
}

/// Start a Prometheus exporter on `0.0.0.0:<port>` and register metric
/// descriptions. Subsequent calls return the existing handle.
pub fn init_metrics(port: u16) -> Option<&'static PrometheusHandle> {
    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install_recorder()
    {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            describe_metrics();
            info!(metrics_port = port, "started prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
            PROMETHEUS_HANDLE.get()
        }
    }
}
