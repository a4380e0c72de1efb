//! Ledger capability interface.
//!
//! The state machine is written against [`LedgerApi`]; adapters for
//! concrete chains implement it. This is the seam that lets the same core
//! target different ledgers.

use crate::{
    error::LedgerError,
    types::{AssetId, LedgerAddress, TxId},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::fmt;

/// Type alias for `Result<T, LedgerError>`.
pub type Result<T> = core::result::Result<T, LedgerError>;

/// Opaque signing material for a custodial wallet.
///
/// Redacted from `Debug` output and never serialized; the string form is
/// only readable inside the crate, on the signing path.
#[derive(Clone)]
pub struct WalletSecret(String);

impl WalletSecret {
    /// Wraps chain-native signing material.
    pub fn new(material: impl Into<String>) -> Self {
        Self(material.into())
    }

    /// The raw material. Must never be logged or serialized.
    pub(crate) fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WalletSecret(<redacted>)")
    }
}

/// Classification of a resolved ledger transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedTxKind {
    /// The chain's native value-transfer type.
    Payment,
    /// Anything else, carrying the chain-native type name.
    Other(String),
}

/// A transaction resolved from the ledger.
#[derive(Clone, Debug)]
pub struct ResolvedTx {
    /// Transaction classification.
    pub kind: ResolvedTxKind,
    /// Destination account, if the type has one.
    pub destination: Option<LedgerAddress>,
    /// Asset actually delivered.
    pub asset: AssetId,
    /// Amount actually delivered, smallest units.
    pub delivered: U256,
    /// Whether the transaction is included in a validated ledger.
    pub validated: bool,
}

/// Capabilities the coordinator requires from an external ledger.
#[async_trait]
pub trait LedgerApi: fmt::Debug + Send + Sync {
    /// Generates a fresh keypair from cryptographically secure entropy.
    async fn generate_wallet(&self) -> Result<(LedgerAddress, WalletSecret)>;

    /// Tops `address` up to at least `min` native units.
    ///
    /// Backed by a faucet on test networks; fails with
    /// [`LedgerError::FaucetUnavailable`] where no faucet is configured.
    async fn ensure_funded(&self, address: &LedgerAddress, min: U256) -> Result<()>;

    /// Resolves a transaction by id.
    async fn resolve_tx(&self, tx_id: TxId) -> Result<ResolvedTx>;

    /// Reads the confirmed balance of `address` in `asset`.
    async fn read_balance(&self, address: &LedgerAddress, asset: &AssetId) -> Result<U256>;

    /// Signs and submits a value transfer, waiting for validated inclusion.
    ///
    /// Returns the transaction id only on a validated, ledger-native
    /// success result.
    async fn submit_transfer(
        &self,
        secret: &WalletSecret,
        from: &LedgerAddress,
        to: &LedgerAddress,
        asset: &AssetId,
        amount: U256,
    ) -> Result<TxId>;

    /// Checks the ledger endpoint is reachable.
    async fn ping(&self) -> Result<()>;
}
