//! Escrow storage implementation in-memory.
//!
//! The coordinator requires no durability across restarts, so this is the
//! production backend as well as the test one.

use super::api::{Result, StorageApi};
use crate::{
    error::StorageError,
    types::{Escrow, EscrowId},
};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

/// [`StorageApi`] implementation in-memory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    escrows: DashMap<EscrowId, Escrow>,
}

#[async_trait]
impl StorageApi for InMemoryStorage {
    async fn insert_escrow(&self, escrow: Escrow) -> Result<()> {
        match self.escrows.entry(escrow.id) {
            Entry::Occupied(_) => Err(StorageError::DuplicateEscrow(escrow.id)),
            Entry::Vacant(slot) => {
                slot.insert(escrow);
                Ok(())
            }
        }
    }

    async fn read_escrow(&self, id: EscrowId) -> Result<Option<Escrow>> {
        Ok(self.escrows.get(&id).map(|escrow| escrow.clone()))
    }

    async fn write_escrow(&self, escrow: Escrow) -> Result<()> {
        match self.escrows.entry(escrow.id) {
            Entry::Occupied(mut slot) => {
                slot.insert(escrow);
                Ok(())
            }
            Entry::Vacant(_) => Err(StorageError::MissingEscrow(escrow.id)),
        }
    }

    async fn count_active(&self) -> Result<u64> {
        Ok(self.escrows.iter().filter(|entry| !entry.status.is_terminal()).count() as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
