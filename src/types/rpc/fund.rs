//! RPC funding-verification request and response types.

use crate::types::{EscrowId, LedgerAddress, TxId};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Parameters for the `escrow_fund` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundParameters {
    /// Escrow to mark as funded.
    pub escrow_id: EscrowId,
    /// Advisory sender address; not verified against the deposits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<LedgerAddress>,
    /// Deposit transactions to verify. Duplicates are ignored.
    pub tx_ids: Vec<TxId>,
}

/// Response for the `escrow_fund` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundResponse {
    /// Sum of delivered amounts in the escrow's principal asset.
    #[serde(with = "crate::serde::u256_dec")]
    pub total_received: U256,
    /// Transactions that passed verification, in id order.
    pub verified_txs: Vec<TxId>,
}
