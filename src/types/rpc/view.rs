//! RPC query response types.

use crate::types::{
    AssetId, Escrow, EscrowId, EscrowSide, EscrowStatus, LedgerAddress, TimelockSchedule, TxId,
};
use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Public view of an escrow record returned by `escrow_getEscrow`.
///
/// Contains no wallet key material; the only wallet-derived field is the
/// public funding address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowView {
    /// Escrow identifier.
    pub id: EscrowId,
    /// Identifier of the corresponding off-chain order.
    pub order_hash: B256,
    /// keccak-256 digest the secret must hash to.
    pub hashlock: B256,
    /// Recipient of the principal.
    pub maker: LedgerAddress,
    /// Depositor.
    pub taker: LedgerAddress,
    /// Principal asset.
    pub token: AssetId,
    /// Principal, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub amount: U256,
    /// Settlement incentive, native smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub safety_deposit: U256,
    /// Absolute phase schedule.
    pub timelocks: TimelockSchedule,
    /// Funding address of the custodial wallet.
    pub wallet_address: LedgerAddress,
    /// Current lifecycle status.
    pub status: EscrowStatus,
    /// Which leg of the swap this escrow holds.
    pub side: EscrowSide,
    /// Accepted deposit transactions.
    pub funding_tx_ids: Vec<TxId>,
    /// The revealed secret, present once withdrawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<B256>,
    /// Settlement transactions, in submission order.
    pub settlement_tx_ids: Vec<TxId>,
}

impl From<&Escrow> for EscrowView {
    fn from(escrow: &Escrow) -> Self {
        Self {
            id: escrow.id,
            order_hash: escrow.order_hash,
            hashlock: escrow.hashlock,
            maker: escrow.maker.clone(),
            taker: escrow.taker.clone(),
            token: escrow.token.clone(),
            amount: escrow.amount,
            safety_deposit: escrow.safety_deposit,
            timelocks: escrow.timelocks.into(),
            wallet_address: escrow.wallet_address.clone(),
            status: escrow.status,
            side: escrow.side,
            funding_tx_ids: escrow.funding_tx_ids.iter().copied().collect(),
            secret: escrow.secret,
            settlement_tx_ids: escrow.settlement_tx_ids.clone(),
        }
    }
}

/// Response for the `escrow_health` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Whether the coordinator is fully operational.
    pub healthy: bool,
    /// Whether the ledger endpoint answered the last probe.
    pub connected: bool,
    /// Number of escrows in a non-terminal status.
    pub active_escrows: u64,
    /// Coordinator version.
    pub version: String,
}
