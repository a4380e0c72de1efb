//! Escrow relay types.

mod asset;
pub use asset::{AssetId, LedgerAddress};

mod escrow;
pub use escrow::{Escrow, EscrowId, EscrowSide, EscrowStatus, RequiredDeposit};

pub mod timelocks;
pub use timelocks::{Stage, TimelockSchedule, Timelocks};

pub mod rpc;

use alloy::primitives::B256;

/// Ledger transaction identifier (256-bit transaction hash).
pub type TxId = B256;
