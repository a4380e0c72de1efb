//! Ledger implementation in-memory. For testing only.

use super::api::{LedgerApi, ResolvedTx, ResolvedTxKind, Result, WalletSecret};
use crate::{
    error::LedgerError,
    types::{AssetId, LedgerAddress, TxId},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

/// A transfer accepted by [`InMemoryLedger::submit_transfer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTransfer {
    /// Transaction id assigned to the transfer.
    pub tx_id: TxId,
    /// Sending account.
    pub from: LedgerAddress,
    /// Receiving account.
    pub to: LedgerAddress,
    /// Asset transferred.
    pub asset: AssetId,
    /// Amount transferred, smallest units.
    pub amount: U256,
}

/// [`LedgerApi`] implementation in-memory. Used for testing.
///
/// Transactions are resolvable immediately, balances are tracked per
/// `(address, asset)` pair, and wallet generation is deterministic. Seeding
/// helpers simulate inbound deposits.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    txs: DashMap<TxId, ResolvedTx>,
    balances: DashMap<(LedgerAddress, AssetId), U256>,
    wallets: DashMap<LedgerAddress, String>,
    transfers: Mutex<Vec<RecordedTransfer>>,
    counter: AtomicU64,
    /// Remaining transfers to accept before rejecting; `None` accepts all.
    transfer_budget: Mutex<Option<u64>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_tx_id(&self) -> TxId {
        TxId::from(U256::from(self.counter.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn credit(&self, address: &LedgerAddress, asset: &AssetId, amount: U256) {
        *self.balances.entry((address.clone(), asset.clone())).or_insert(U256::ZERO) += amount;
    }

    /// Seeds a validated inbound payment and credits the destination.
    pub fn seed_payment(&self, destination: &LedgerAddress, asset: AssetId, amount: U256) -> TxId {
        let tx_id = self.next_tx_id();
        self.credit(destination, &asset, amount);
        self.txs.insert(
            tx_id,
            ResolvedTx {
                kind: ResolvedTxKind::Payment,
                destination: Some(destination.clone()),
                asset,
                delivered: amount,
                validated: true,
            },
        );
        tx_id
    }

    /// Seeds a payment that has not reached a validated ledger yet.
    pub fn seed_unvalidated_payment(
        &self,
        destination: &LedgerAddress,
        asset: AssetId,
        amount: U256,
    ) -> TxId {
        let tx_id = self.next_tx_id();
        self.txs.insert(
            tx_id,
            ResolvedTx {
                kind: ResolvedTxKind::Payment,
                destination: Some(destination.clone()),
                asset,
                delivered: amount,
                validated: false,
            },
        );
        tx_id
    }

    /// Seeds a validated transaction of a non-payment type.
    pub fn seed_non_payment(&self, destination: &LedgerAddress) -> TxId {
        let tx_id = self.next_tx_id();
        self.txs.insert(
            tx_id,
            ResolvedTx {
                kind: ResolvedTxKind::Other("AccountSet".to_string()),
                destination: Some(destination.clone()),
                asset: AssetId::Native,
                delivered: U256::ZERO,
                validated: true,
            },
        );
        tx_id
    }

    /// Current balance of `address` in `asset`.
    pub fn balance_of(&self, address: &LedgerAddress, asset: &AssetId) -> U256 {
        self.balances
            .get(&(address.clone(), asset.clone()))
            .map(|balance| *balance)
            .unwrap_or_default()
    }

    /// Transfers accepted so far, in submission order.
    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.lock().expect("transfer log poisoned").clone()
    }

    /// Makes every subsequent [`LedgerApi::submit_transfer`] fail.
    pub fn set_reject_transfers(&self, reject: bool) {
        *self.transfer_budget.lock().expect("transfer budget poisoned") = reject.then_some(0);
    }

    /// Accepts `accepted` more transfers, then rejects the rest.
    pub fn reject_transfers_after(&self, accepted: u64) {
        *self.transfer_budget.lock().expect("transfer budget poisoned") = Some(accepted);
    }
}

#[async_trait]
impl LedgerApi for InMemoryLedger {
    async fn generate_wallet(&self) -> Result<(LedgerAddress, WalletSecret)> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let address = LedgerAddress::new(format!("rEscrowWallet{n:04}"));
        let secret = format!("shhTestSecret{n:04}");
        self.wallets.insert(address.clone(), secret.clone());
        Ok((address, WalletSecret::new(secret)))
    }

    async fn ensure_funded(&self, address: &LedgerAddress, min: U256) -> Result<()> {
        let balance = self.balance_of(address, &AssetId::Native);
        if balance < min {
            self.credit(address, &AssetId::Native, min - balance);
        }
        Ok(())
    }

    async fn resolve_tx(&self, tx_id: TxId) -> Result<ResolvedTx> {
        self.txs.get(&tx_id).map(|tx| tx.clone()).ok_or(LedgerError::TxNotFound(tx_id))
    }

    async fn read_balance(&self, address: &LedgerAddress, asset: &AssetId) -> Result<U256> {
        Ok(self.balance_of(address, asset))
    }

    async fn submit_transfer(
        &self,
        secret: &WalletSecret,
        from: &LedgerAddress,
        to: &LedgerAddress,
        asset: &AssetId,
        amount: U256,
    ) -> Result<TxId> {
        {
            let mut budget = self.transfer_budget.lock().expect("transfer budget poisoned");
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(LedgerError::Rejected("tecUNFUNDED_PAYMENT".to_string()));
                }
                *remaining -= 1;
            }
        }
        let known = self.wallets.get(from).is_some_and(|entry| *entry == secret.reveal());
        if !known {
            return Err(LedgerError::Signing(format!("secret does not control {from}")));
        }

        let mut balance =
            self.balances.entry((from.clone(), asset.clone())).or_insert(U256::ZERO);
        if *balance < amount {
            return Err(LedgerError::Rejected("tecUNFUNDED_PAYMENT".to_string()));
        }
        *balance -= amount;
        drop(balance);
        self.credit(to, asset, amount);

        let tx_id = self.next_tx_id();
        self.txs.insert(
            tx_id,
            ResolvedTx {
                kind: ResolvedTxKind::Payment,
                destination: Some(to.clone()),
                asset: asset.clone(),
                delivered: amount,
                validated: true,
            },
        );
        self.transfers.lock().expect("transfer log poisoned").push(RecordedTransfer {
            tx_id,
            from: from.clone(),
            to: to.clone(),
            asset: asset.clone(),
            amount,
        });
        Ok(tx_id)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
