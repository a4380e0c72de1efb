//! Escrow records and lifecycle states.

use crate::{
    error::EscrowError,
    types::{AssetId, LedgerAddress, Stage, Timelocks, TxId},
};
use alloy::primitives::{B128, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Process-wide unique escrow identifier.
pub type EscrowId = B128;

/// Lifecycle status of an escrow.
///
/// Transitions form a DAG: `Created → Funded → {Withdrawn, Cancelled}`,
/// with `Rescued` reachable from any non-terminal status after the rescue
/// delay. A status never regresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscrowStatus {
    /// Record exists, deposit not yet verified.
    Created,
    /// Required deposit verified at the custodial wallet.
    Funded,
    /// Principal paid out to the maker on secret reveal.
    Withdrawn,
    /// Deposit refunded after the cancellation window opened.
    Cancelled,
    /// Wallet swept by the taker via the emergency escape hatch.
    Rescued,
}

impl EscrowStatus {
    /// Whether no further transition is admissible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Withdrawn | Self::Cancelled | Self::Rescued)
    }

    /// Whether `next` is reachable from `self` in one transition.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Funded)
                | (Self::Funded, Self::Withdrawn)
                | (Self::Funded, Self::Cancelled)
                | (Self::Created, Self::Rescued)
                | (Self::Funded, Self::Rescued)
        )
    }
}

/// Which leg of the swap this escrow holds; selects the refund split on
/// cancellation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscrowSide {
    /// Maker-funded leg; cancellation refunds the principal to the maker.
    Source,
    /// Taker-funded leg; cancellation refunds everything to the taker.
    #[default]
    Destination,
}

/// Deposit the caller must deliver to the custodial wallet, split by asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredDeposit {
    /// Native-asset portion, smallest units.
    #[serde(with = "crate::serde::u256_dec")]
    pub native: U256,
    /// Issued-token portion; zero for native-asset escrows.
    #[serde(with = "crate::serde::u256_dec")]
    pub token: U256,
}

/// A single escrow record.
///
/// Created once per swap and mutated only through state-machine
/// transitions; `funding_tx_ids` is append-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Escrow {
    /// Opaque 128-bit identifier, unique process-wide.
    pub id: EscrowId,
    /// Identifier of the corresponding off-chain order.
    pub order_hash: B256,
    /// keccak-256 digest the revealed secret must hash to.
    pub hashlock: B256,
    /// Recipient of the principal on successful reveal.
    pub maker: LedgerAddress,
    /// Depositor; may cancel or rescue.
    pub taker: LedgerAddress,
    /// Principal asset.
    pub token: AssetId,
    /// Principal released to the maker, smallest units.
    pub amount: U256,
    /// Incentive paid to whoever executes a settlement on time.
    pub safety_deposit: U256,
    /// Packed phase schedule, stamped with `deployed_at`.
    pub timelocks: Timelocks,
    /// Unix timestamp captured at creation.
    pub deployed_at: u64,
    /// Public funding address of the custodial wallet.
    pub wallet_address: LedgerAddress,
    /// Current lifecycle status.
    pub status: EscrowStatus,
    /// Which leg of the swap this escrow holds.
    pub side: EscrowSide,
    /// Accepted deposit transactions, in id order.
    pub funding_tx_ids: BTreeSet<TxId>,
    /// The revealed secret, populated on withdrawal.
    pub secret: Option<B256>,
    /// Transactions produced during settlement, in submission order.
    pub settlement_tx_ids: Vec<TxId>,
}

impl Escrow {
    /// The deposit required before the escrow counts as funded.
    ///
    /// For a native-asset escrow the principal and the safety deposit
    /// travel together; for an issued token the safety deposit is still
    /// collected in the native asset.
    pub fn required_deposit(&self) -> RequiredDeposit {
        if self.token.is_native() {
            RequiredDeposit { native: self.amount + self.safety_deposit, token: U256::ZERO }
        } else {
            RequiredDeposit { native: self.safety_deposit, token: self.amount }
        }
    }

    /// Deposit required in the escrow's principal asset.
    pub fn required_principal(&self) -> U256 {
        if self.token.is_native() { self.amount + self.safety_deposit } else { self.amount }
    }

    /// Absolute Unix time at which `stage` opens for this escrow.
    pub fn stage_time(&self, stage: Stage) -> u64 {
        self.timelocks.stage_time(stage)
    }

    /// Moves the record to `next`, enforcing the status DAG.
    ///
    /// Every status write goes through here; a transition the DAG does not
    /// admit is rejected without touching the record.
    pub fn advance(&mut self, next: EscrowStatus) -> Result<(), EscrowError> {
        if !self.status.can_advance_to(next) {
            return Err(EscrowError::InvalidState { status: self.status });
        }
        self.status = next;
        Ok(())
    }
}
