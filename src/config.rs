//! Escrow relay configuration.

use crate::constants::{
    DEFAULT_ACTIVATION_RESERVE_DROPS, DEFAULT_HTTP_PORT, DEFAULT_LEDGER_ENDPOINT,
    DEFAULT_LEDGER_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DEFAULT_METRICS_PORT, DEFAULT_RESCUE_DELAY,
};
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::Path,
    time::Duration,
};
use url::Url;

/// Coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Ledger endpoint configuration.
    pub ledger: LedgerConfig,
    /// Escrow timing configuration.
    pub escrow: EscrowConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address to serve the RPC on.
    pub address: IpAddr,
    /// The port to serve the RPC on.
    pub port: u16,
    /// The port to serve the metrics on.
    pub metrics_port: u16,
    /// The maximum number of concurrent connections.
    pub max_connections: u32,
}

/// Ledger endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the external ledger.
    pub endpoint: Url,
    /// Testnet faucet used for wallet activation. Leave unset on mainnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucet: Option<Url>,
    /// Deadline for a single ledger call.
    #[serde(with = "crate::serde::duration")]
    pub request_timeout: Duration,
}

/// Escrow timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Delay after which the rescue escape hatch opens.
    #[serde(with = "crate::serde::duration")]
    pub rescue_delay: Duration,
    /// Clock slack applied to withdrawal windows. Zero in production; an
    /// integration knob compensating for skew against the counterpart
    /// chain.
    #[serde(with = "crate::serde::duration")]
    pub withdrawal_slack: Duration,
    /// Clock slack applied to cancellation windows.
    #[serde(with = "crate::serde::duration")]
    pub cancellation_slack: Duration,
    /// Native reserve fresh custodial wallets are topped up to via the
    /// faucet, in smallest units. Unset disables activation top-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_reserve: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: DEFAULT_HTTP_PORT,
                metrics_port: DEFAULT_METRICS_PORT,
                max_connections: DEFAULT_MAX_CONNECTIONS,
            },
            ledger: LedgerConfig {
                endpoint: DEFAULT_LEDGER_ENDPOINT.parse().expect("valid URL"),
                faucet: None,
                request_timeout: DEFAULT_LEDGER_TIMEOUT,
            },
            escrow: EscrowConfig {
                rescue_delay: DEFAULT_RESCUE_DELAY,
                withdrawal_slack: Duration::ZERO,
                cancellation_slack: Duration::ZERO,
                activation_reserve: None,
            },
        }
    }
}

impl CoordinatorConfig {
    /// Loads the configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&raw).wrap_err("failed to parse config")
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, toml::to_string_pretty(self)?)
            .wrap_err_with(|| format!("failed to write config to {}", path.display()))
    }

    /// Sets the server listen address.
    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.server.address = address;
        self
    }

    /// Sets the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Sets the metrics port.
    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.server.metrics_port = port;
        self
    }

    /// Sets the ledger endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.ledger.endpoint = endpoint;
        }
        self
    }

    /// Sets the faucet endpoint.
    ///
    /// A configured faucet implies a test network, so wallet activation
    /// top-up is enabled at the default reserve unless one is already set.
    pub fn with_faucet(mut self, faucet: Option<Url>) -> Self {
        if faucet.is_some() {
            self.ledger.faucet = faucet;
            self.escrow.activation_reserve.get_or_insert(DEFAULT_ACTIVATION_RESERVE_DROPS);
        }
        self
    }

    /// Sets the rescue delay.
    pub fn with_rescue_delay(mut self, delay: Duration) -> Self {
        self.escrow.rescue_delay = delay;
        self
    }

    /// Sets the withdrawal-window slack.
    pub fn with_withdrawal_slack(mut self, slack: Duration) -> Self {
        self.escrow.withdrawal_slack = slack;
        self
    }

    /// Sets the cancellation-window slack.
    pub fn with_cancellation_slack(mut self, slack: Duration) -> Self {
        self.escrow.cancellation_slack = slack;
        self
    }
}
