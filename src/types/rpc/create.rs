//! RPC escrow-creation request and response types.

use crate::types::{
    AssetId, EscrowId, EscrowSide, LedgerAddress, RequiredDeposit, TimelockSchedule, Timelocks,
};
use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Parameters for the `escrow_createDst` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDstParameters {
    /// Identifier of the corresponding off-chain order.
    pub order_hash: B256,
    /// keccak-256 digest of the 32-byte secret.
    pub hashlock: B256,
    /// Recipient of the principal on reveal.
    pub maker: LedgerAddress,
    /// Depositor; the only party that may cancel or rescue.
    pub taker: LedgerAddress,
    /// Principal asset.
    pub token: AssetId,
    /// Principal, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub amount: U256,
    /// Incentive for timely settlement, native smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub safety_deposit: U256,
    /// Packed timelock word; the embedded deploy timestamp is ignored and
    /// replaced with one captured at creation.
    pub timelocks: Timelocks,
    /// Which leg of the swap this escrow holds.
    #[serde(default, rename = "type")]
    pub side: EscrowSide,
}

/// Response for the `escrow_createDst` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDstResponse {
    /// Identifier of the freshly created escrow.
    pub escrow_id: EscrowId,
    /// Funding address of the escrow's custodial wallet.
    pub wallet_address: LedgerAddress,
    /// Deposit the caller must deliver before funding is accepted.
    pub required_deposit: RequiredDeposit,
    /// Absolute phase schedule derived at creation.
    pub timelocks: TimelockSchedule,
}
