//! Escrow relay constants.

use std::time::Duration;

/// Default port for the RPC server.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default port for the metrics exporter.
pub const DEFAULT_METRICS_PORT: u16 = 9000;

/// Default maximum number of concurrent RPC connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 100;

/// Default deadline for a single ledger call.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay before the rescue escape hatch opens.
pub const DEFAULT_RESCUE_DELAY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Rescue delay used by integration builds.
pub const INTEGRATION_RESCUE_DELAY: Duration = Duration::from_secs(30 * 60);

/// Attempts for idempotent ledger reads.
pub const LEDGER_READ_ATTEMPTS: usize = 3;

/// Initial backoff between ledger read attempts; doubles per retry.
pub const LEDGER_BACKOFF_BASE: Duration = Duration::from_millis(250);

/// Interval between polls while waiting for validated inclusion.
pub const VALIDATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default XRPL JSON-RPC endpoint (testnet).
pub const DEFAULT_LEDGER_ENDPOINT: &str = "https://s.altnet.rippletest.net:51234/";

/// Activation reserve suggested for fresh custodial wallets, in drops.
pub const DEFAULT_ACTIVATION_RESERVE_DROPS: u64 = 10_000_000;
