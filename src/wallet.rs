//! Custodial wallet manager.
//!
//! One wallet per escrow. Public addresses live in the escrow record;
//! signing material lives here, keyed by escrow id, and leaves only
//! through [`WalletManager::sign_and_submit`]. No query path can reach it.

use crate::{
    error::LedgerError,
    ledger::{Ledger, LedgerApi, WalletSecret},
    types::{AssetId, EscrowId, LedgerAddress, TxId},
};
use alloy::primitives::U256;
use dashmap::DashMap;
use std::sync::Arc;

/// Per-escrow wallet generation and signing.
#[derive(Debug, Clone)]
pub struct WalletManager {
    secrets: Arc<DashMap<EscrowId, WalletSecret>>,
    ledger: Ledger,
}

impl WalletManager {
    /// Creates a manager signing through `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        Self { secrets: Arc::new(DashMap::new()), ledger }
    }

    /// Generates a wallet for `escrow_id` and retains its secret.
    ///
    /// Returns only the public funding address.
    pub async fn create_wallet(&self, escrow_id: EscrowId) -> Result<LedgerAddress, LedgerError> {
        let (address, secret) = self.ledger.generate_wallet().await?;
        self.secrets.insert(escrow_id, secret);
        Ok(address)
    }

    /// Signs and submits a transfer out of the escrow's wallet.
    pub async fn sign_and_submit(
        &self,
        escrow_id: EscrowId,
        from: &LedgerAddress,
        to: &LedgerAddress,
        asset: &AssetId,
        amount: U256,
    ) -> Result<TxId, LedgerError> {
        let secret = self
            .secrets
            .get(&escrow_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                LedgerError::Signing(format!("no signing material for escrow {escrow_id}"))
            })?;
        self.ledger.submit_transfer(&secret, from, to, asset, amount).await
    }
}
