//! Ledger adapters.

mod api;
pub use api::{LedgerApi, ResolvedTx, ResolvedTxKind, WalletSecret};

mod memory;
pub use memory::{InMemoryLedger, RecordedTransfer};

mod xrpl;
pub use xrpl::XrplLedger;

use crate::{
    config::LedgerConfig,
    types::{AssetId, LedgerAddress, TxId},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;

/// Handle to the ledger adapter shared across services.
#[derive(Clone, Debug)]
pub struct Ledger {
    inner: Arc<dyn LedgerApi>,
}

impl Ledger {
    /// Wraps an adapter implementation.
    pub fn new(inner: Arc<dyn LedgerApi>) -> Self {
        Self { inner }
    }

    /// Creates a [`Ledger`] backed by an XRPL JSON-RPC endpoint.
    pub fn xrpl(config: &LedgerConfig) -> Self {
        Self::new(Arc::new(XrplLedger::new(
            config.endpoint.clone(),
            config.faucet.clone(),
            config.request_timeout,
        )))
    }

    /// Creates a [`Ledger`] with an in-memory backend. Used for testing only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLedger::new()))
    }
}

#[async_trait]
impl LedgerApi for Ledger {
    async fn generate_wallet(&self) -> api::Result<(LedgerAddress, WalletSecret)> {
        self.inner.generate_wallet().await
    }

    async fn ensure_funded(&self, address: &LedgerAddress, min: U256) -> api::Result<()> {
        self.inner.ensure_funded(address, min).await
    }

    async fn resolve_tx(&self, tx_id: TxId) -> api::Result<ResolvedTx> {
        self.inner.resolve_tx(tx_id).await
    }

    async fn read_balance(&self, address: &LedgerAddress, asset: &AssetId) -> api::Result<U256> {
        self.inner.read_balance(address, asset).await
    }

    async fn submit_transfer(
        &self,
        secret: &WalletSecret,
        from: &LedgerAddress,
        to: &LedgerAddress,
        asset: &AssetId,
        amount: U256,
    ) -> api::Result<TxId> {
        self.inner.submit_transfer(secret, from, to, asset, amount).await
    }

    async fn ping(&self) -> api::Result<()> {
        self.inner.ping().await
    }
}
