//! Ledger adapter errors.

use crate::types::TxId;
use thiserror::Error;

/// Errors surfaced by a ledger adapter.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger endpoint could not be reached or returned garbage.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// A ledger call exceeded its deadline.
    #[error("ledger request timed out")]
    Timeout,
    /// The transaction is unknown to the ledger.
    #[error("transaction {0} not found on the ledger")]
    TxNotFound(TxId),
    /// The transfer was rejected with a ledger-native failure result.
    #[error("transfer rejected by the ledger: {0}")]
    Rejected(String),
    /// Signing material was missing or unusable.
    #[error("signing failed: {0}")]
    Signing(String),
    /// Top-up was requested but no faucet is configured.
    #[error("faucet top-up unavailable on this network")]
    FaucetUnavailable,
    /// The endpoint answered with a shape the adapter cannot interpret.
    #[error("malformed ledger response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Unavailable(err.to_string()) }
    }
}
