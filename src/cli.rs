//! # Escrow relay CLI

use crate::{
    config::CoordinatorConfig,
    constants::{DEFAULT_HTTP_PORT, DEFAULT_METRICS_PORT, INTEGRATION_RESCUE_DELAY},
    spawn::try_spawn_with_args,
};
use clap::Parser;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};
use url::Url;

/// The escrow relay coordinates custodial HTLC escrows on ledgers without
/// native multi-phase timelock scripting.
#[derive(Debug, Parser)]
#[command(author, about = "Escrow relay", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be stored in the working directory
    /// under `escrow-relay.toml`.
    #[arg(
        long,
        value_name = "CONFIG",
        env = "ESCROW_RELAY_CONFIG",
        default_value = "escrow-relay.toml"
    )]
    pub config: PathBuf,
    /// The address to serve the RPC on.
    #[arg(long = "http.addr", value_name = "ADDR", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub address: IpAddr,
    /// The port to serve the RPC on.
    #[arg(long = "http.port", value_name = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,
    /// The port to serve the metrics on.
    #[arg(long = "http.metrics-port", value_name = "PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,
    /// The JSON-RPC endpoint of the external ledger.
    #[arg(long = "endpoint", value_name = "LEDGER_ENDPOINT", env = "ESCROW_RELAY_ENDPOINT")]
    pub endpoint: Option<Url>,
    /// Testnet faucet endpoint for wallet activation. Leave unset on
    /// mainnet.
    #[arg(long = "faucet", value_name = "FAUCET_URL")]
    pub faucet: Option<Url>,
    /// Delay before the rescue escape hatch opens.
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "604800")]
    pub rescue_delay: Duration,
    /// Applies integration-build timing: shortens the rescue delay to 30
    /// minutes, overriding `--rescue-delay`.
    #[arg(long, default_value_t = false)]
    pub integration: bool,
    /// Clock slack applied to withdrawal windows.
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "0")]
    pub withdrawal_slack: Duration,
    /// Clock slack applied to cancellation windows.
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "0")]
    pub cancellation_slack: Duration,
}

impl Args {
    /// Run the escrow relay service.
    pub async fn run(self) -> eyre::Result<()> {
        let config_path = self.config.clone();
        try_spawn_with_args(self, &config_path).await?.server.stopped().await;

        Ok(())
    }

    /// Merges [`Args`] values into an existing [`CoordinatorConfig`].
    pub fn merge_config(self, config: CoordinatorConfig) -> CoordinatorConfig {
        let rescue_delay =
            if self.integration { INTEGRATION_RESCUE_DELAY } else { self.rescue_delay };
        config
            .with_address(self.address)
            .with_port(self.port)
            .with_metrics_port(self.metrics_port)
            .with_endpoint(self.endpoint)
            .with_faucet(self.faucet)
            .with_rescue_delay(rescue_delay)
            .with_withdrawal_slack(self.withdrawal_slack)
            .with_cancellation_slack(self.cancellation_slack)
    }
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
