//! Escrow state-machine errors.

use crate::{
    error::{LedgerError, StorageError},
    types::{EscrowId, EscrowStatus, LedgerAddress, Stage, TxId},
};
use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// The escrow coordinator overarching error type.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// The escrow id is unknown.
    #[error("escrow {0} not found")]
    NotFound(EscrowId),
    /// The operation is not permitted in the escrow's current status.
    #[error("operation not permitted while escrow is {status:?}")]
    InvalidState {
        /// Status the escrow was in when the operation was rejected.
        status: EscrowStatus,
    },
    /// The supplied secret does not hash to the escrow's hashlock.
    #[error("secret does not match the hashlock")]
    InvalidSecret,
    /// The caller is not the party entitled to act in this phase.
    #[error("caller {0} is not authorized for this phase")]
    Unauthorized(LedgerAddress),
    /// The requested action's window has not opened yet.
    #[error("{stage:?} window not yet open, opens at {opens_at}")]
    NotYetOpen {
        /// Phase gating the action.
        stage: Stage,
        /// Unix time at which the window opens.
        opens_at: u64,
    },
    /// The requested action's window has already closed.
    #[error("{stage:?} window closed at {closed_at}")]
    WindowClosed {
        /// Phase that bounds the window.
        stage: Stage,
        /// Unix time at which the window closed.
        closed_at: u64,
    },
    /// Verified deposits fall short of the required amount.
    #[error("insufficient funding: received {received}, required {required}")]
    InsufficientFunding {
        /// Sum of verified deposits in the principal asset.
        received: U256,
        /// Required deposit in the principal asset.
        required: U256,
    },
    /// A funding transaction failed verification.
    #[error("transaction {tx_id} invalid: {reason}")]
    InvalidTransaction {
        /// The offending transaction.
        tx_id: TxId,
        /// What the verification found.
        reason: String,
    },
    /// The rescue delay has not elapsed yet.
    #[error("rescue not available until {available_at}")]
    RescueNotAvailable {
        /// Instant at which rescue becomes available.
        available_at: DateTime<Utc>,
    },
    /// A settlement transfer was rejected; the escrow state did not advance.
    #[error("settlement failed: {0}")]
    SettlementFailed(#[source] LedgerError),
    /// Malformed or inconsistent request parameters.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Errors talking to the external ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Errors from the escrow store.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}

impl EscrowError {
    /// Machine-readable error kind, attached to RPC error objects.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "notFound",
            Self::InvalidState { .. } => "invalidState",
            Self::InvalidSecret => "invalidSecret",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotYetOpen { .. } | Self::RescueNotAvailable { .. } => "notYetOpen",
            Self::WindowClosed { .. } => "windowClosed",
            Self::InsufficientFunding { .. } => "insufficientFunding",
            Self::InvalidTransaction { .. } => "invalidTransaction",
            Self::SettlementFailed(_) => "settlementFailed",
            Self::InvalidParameters(_) => "invalidParameters",
            Self::Ledger(LedgerError::Timeout) => "ledgerTimeout",
            Self::Ledger(_) => "ledgerUnavailable",
            Self::Storage(_) | Self::Internal(_) => "internal",
        }
    }
}
