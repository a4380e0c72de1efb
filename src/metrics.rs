//! Escrow relay metrics.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::debug;

/// Escrows created.
pub const ESCROWS_CREATED: &str = "escrow_relay_escrows_created_total";
/// Escrows that reached funded.
pub const ESCROWS_FUNDED: &str = "escrow_relay_escrows_funded_total";
/// Escrows withdrawn to the maker.
pub const ESCROWS_WITHDRAWN: &str = "escrow_relay_escrows_withdrawn_total";
/// Escrows refunded.
pub const ESCROWS_CANCELLED: &str = "escrow_relay_escrows_cancelled_total";
/// Escrows swept through the escape hatch.
pub const ESCROWS_RESCUED: &str = "escrow_relay_escrows_rescued_total";
/// Settlement transfers rejected by the ledger.
pub const SETTLEMENT_FAILURES: &str = "escrow_relay_settlement_failures_total";

/// Installs the Prometheus exporter and registers metric descriptions.
///
/// Installation failures are non-fatal: a second spawn in the same process
/// keeps the first exporter.
pub fn setup_exporter(addr: impl Into<SocketAddr>) {
    if let Err(err) = PrometheusBuilder::new().with_http_listener(addr.into()).install() {
        debug!(%err, "metrics exporter not installed");
    }

    describe_counter!(ESCROWS_CREATED, "Escrows created");
    describe_counter!(ESCROWS_FUNDED, "Escrows that reached funded status");
    describe_counter!(ESCROWS_WITHDRAWN, "Escrows withdrawn to the maker");
    describe_counter!(ESCROWS_CANCELLED, "Escrows refunded to their depositors");
    describe_counter!(ESCROWS_RESCUED, "Escrows swept via rescue");
    describe_counter!(SETTLEMENT_FAILURES, "Settlement transfers rejected by the ledger");
}
