//! Escrow relay spawn utilities.

use crate::{
    cli::Args,
    config::CoordinatorConfig,
    escrow::EscrowService,
    ledger::Ledger,
    metrics,
    rpc::{EscrowApiServer, EscrowRpc},
    storage::EscrowStorage,
    wallet::WalletManager,
};
use http::header;
use jsonrpsee::server::{Server, ServerConfig, ServerHandle};
use std::{net::SocketAddr, path::Path};
use tower::ServiceBuilder;
use tower_http::cors::{AllowMethods, AllowOrigin, CorsLayer};
use tracing::info;

/// A running coordinator.
#[derive(Debug)]
pub struct CoordinatorHandle {
    /// Handle to the RPC server; the service stops when it is dropped.
    pub server: ServerHandle,
    /// Address the RPC server is bound to.
    pub http_addr: SocketAddr,
}

/// Attempts to spawn the coordinator using CLI arguments and a
/// configuration file.
pub async fn try_spawn_with_args<P: AsRef<Path>>(
    args: Args,
    config_path: P,
) -> eyre::Result<CoordinatorHandle> {
    let config = if !config_path.as_ref().exists() {
        let config = args.merge_config(CoordinatorConfig::default());
        config.save_to_file(&config_path)?;
        config
    } else {
        // File exists: load and override with CLI values.
        args.merge_config(CoordinatorConfig::load_from_file(&config_path)?)
    };

    let ledger = Ledger::xrpl(&config.ledger);
    try_spawn(config, ledger).await
}

/// Spawns the coordinator using the provided [`CoordinatorConfig`] and
/// ledger adapter.
pub async fn try_spawn(config: CoordinatorConfig, ledger: Ledger) -> eyre::Result<CoordinatorHandle> {
    let storage = EscrowStorage::in_memory();
    let wallets = WalletManager::new(ledger.clone());
    let service = EscrowService::new(storage, wallets, ledger, config.escrow.clone());
    let rpc = EscrowRpc::new(service).into_rpc();

    metrics::setup_exporter((config.server.address, config.server.metrics_port));

    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::any())
        .allow_origin(AllowOrigin::any())
        .allow_headers([header::CONTENT_TYPE]);

    let server_config = ServerConfig::builder()
        .http_only()
        .max_connections(config.server.max_connections)
        .build();
    let server = Server::builder()
        .set_config(server_config)
        .set_http_middleware(ServiceBuilder::new().layer(cors))
        .build((config.server.address, config.server.port))
        .await?;
    let http_addr = server.local_addr()?;
    info!(addr = %http_addr, ledger = %config.ledger.endpoint, "Started escrow relay");

    Ok(CoordinatorHandle { server: server.start(rpc), http_addr })
}
