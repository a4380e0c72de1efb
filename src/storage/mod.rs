//! Escrow storage.

mod api;
pub use api::StorageApi;

mod memory;
pub use memory::InMemoryStorage;

use crate::types::{Escrow, EscrowId};
use async_trait::async_trait;
use std::sync::Arc;

/// Escrow storage interface shared across services.
#[derive(Debug, Clone)]
pub struct EscrowStorage {
    inner: Arc<dyn StorageApi>,
}

impl EscrowStorage {
    /// Wraps a storage backend.
    pub fn new(inner: Arc<dyn StorageApi>) -> Self {
        Self { inner }
    }

    /// Creates an [`EscrowStorage`] with an in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::default()))
    }
}

#[async_trait]
impl StorageApi for EscrowStorage {
    async fn insert_escrow(&self, escrow: Escrow) -> api::Result<()> {
        self.inner.insert_escrow(escrow).await
    }

    async fn read_escrow(&self, id: EscrowId) -> api::Result<Option<Escrow>> {
        self.inner.read_escrow(id).await
    }

    async fn write_escrow(&self, escrow: Escrow) -> api::Result<()> {
        self.inner.write_escrow(escrow).await
    }

    async fn count_active(&self) -> api::Result<u64> {
        self.inner.count_active().await
    }

    async fn ping(&self) -> api::Result<()> {
        self.inner.ping().await
    }
}
