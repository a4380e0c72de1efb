//! RPC settlement request and response types: withdraw, cancel, rescue.

use crate::types::{EscrowId, LedgerAddress, TxId};
use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Parameters for the `escrow_withdraw` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawParameters {
    /// Escrow to settle.
    pub escrow_id: EscrowId,
    /// The 32-byte hashlock preimage.
    pub secret: B256,
    /// Party executing the withdrawal; receives the safety deposit.
    pub caller_address: LedgerAddress,
    /// Whether to use the public withdrawal window, open to any caller.
    #[serde(default)]
    pub is_public: bool,
}

/// Response for the `escrow_withdraw` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    /// Hash of the principal transfer to the maker.
    pub tx_hash: TxId,
    /// The revealed secret, echoed for the counterpart chain.
    pub secret: B256,
    /// Principal amount released.
    #[serde(with = "crate::serde::u256_dec")]
    pub amount: U256,
}

/// Parameters for the `escrow_cancel` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelParameters {
    /// Escrow to refund.
    pub escrow_id: EscrowId,
    /// Party requesting cancellation; must be the taker.
    pub caller_address: LedgerAddress,
}

/// Response for the `escrow_cancel` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// Refund transactions, in submission order.
    pub cancel_tx_ids: Vec<TxId>,
    /// Total refunded across all transfers, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub total_refunded: U256,
}

/// Parameters for the `escrow_rescue` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueParameters {
    /// Escrow whose wallet to sweep.
    pub escrow_id: EscrowId,
    /// Party requesting the sweep; must be the taker.
    pub caller_address: LedgerAddress,
    /// Native amount to sweep, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub amount: U256,
}

/// Response for the `escrow_rescue` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueResponse {
    /// Hash of the sweep transfer.
    pub tx_hash: TxId,
    /// Amount swept, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub amount: U256,
}
