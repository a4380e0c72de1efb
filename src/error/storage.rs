//! Escrow storage errors.

use crate::types::EscrowId;
use thiserror::Error;

/// Errors surfaced by the escrow store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An escrow with the same id already exists.
    #[error("escrow {0} already exists")]
    DuplicateEscrow(EscrowId),
    /// A write targeted an escrow that was never inserted.
    #[error("escrow {0} missing from storage")]
    MissingEscrow(EscrowId),
    /// The backend failed.
    #[error(transparent)]
    Backend(#[from] eyre::Error),
}
