//! Escrow storage api.

use crate::{
    error::StorageError,
    types::{Escrow, EscrowId},
};
use async_trait::async_trait;
use std::fmt::Debug;

/// Type alias for `Result<T, StorageError>`.
pub type Result<T> = core::result::Result<T, StorageError>;

/// Storage API.
///
/// Stores whole records; transition legality is the state machine's
/// responsibility, not the store's.
#[async_trait]
pub trait StorageApi: Debug + Send + Sync {
    /// Inserts a freshly created escrow; fails if the id already exists.
    async fn insert_escrow(&self, escrow: Escrow) -> Result<()>;

    /// Reads an escrow record by id.
    async fn read_escrow(&self, id: EscrowId) -> Result<Option<Escrow>>;

    /// Overwrites an existing escrow record.
    async fn write_escrow(&self, escrow: Escrow) -> Result<()>;

    /// Number of escrows in a non-terminal status.
    async fn count_active(&self) -> Result<u64>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<()>;
}
