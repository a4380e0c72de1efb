//! Escrow state machine.
//!
//! Orchestrates create → fund → (withdraw ∥ cancel ∥ rescue). All mutation
//! of a single escrow is serialized through a per-escrow mutex token, and
//! a status is only written after the corresponding ledger transfer has
//! reached validated inclusion.

mod window;
pub use window::{unix_now, validate_window};

use crate::{
    config::EscrowConfig,
    error::{EscrowError, LedgerError},
    ledger::{Ledger, LedgerApi, ResolvedTxKind},
    metrics as counters,
    storage::{EscrowStorage, StorageApi},
    types::{
        AssetId, Escrow, EscrowId, EscrowSide, EscrowStatus, LedgerAddress, Stage, TxId,
        rpc::{
            CancelParameters, CancelResponse, CreateDstParameters, CreateDstResponse, EscrowView,
            FundParameters, FundResponse, HealthResponse, RescueParameters, RescueResponse,
            WithdrawParameters, WithdrawResponse,
        },
    },
    version::SHORT_VERSION,
    wallet::WalletManager,
};
use alloy::primitives::{U256, keccak256};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use metrics::counter;
use std::{collections::BTreeSet, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Escrow lifecycle orchestrator.
///
/// Cheap to clone; all clones share the same stores and locks.
#[derive(Debug, Clone)]
pub struct EscrowService {
    storage: EscrowStorage,
    wallets: WalletManager,
    ledger: Ledger,
    config: EscrowConfig,
    locks: Arc<DashMap<EscrowId, Arc<Mutex<()>>>>,
}

impl EscrowService {
    /// Creates a service over the given stores and ledger adapter.
    pub fn new(
        storage: EscrowStorage,
        wallets: WalletManager,
        ledger: Ledger,
        config: EscrowConfig,
    ) -> Self {
        Self { storage, wallets, ledger, config, locks: Arc::new(DashMap::new()) }
    }

    /// The per-escrow mutual-exclusion token.
    fn lock_for(&self, id: EscrowId) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().clone()
    }

    async fn read(&self, id: EscrowId) -> Result<Escrow, EscrowError> {
        self.storage.read_escrow(id).await?.ok_or(EscrowError::NotFound(id))
    }

    /// Creates an escrow with a fresh custodial wallet.
    #[instrument(skip_all, fields(order_hash = %params.order_hash))]
    pub async fn create(
        &self,
        params: CreateDstParameters,
    ) -> Result<CreateDstResponse, EscrowError> {
        if params.maker.is_empty() || params.taker.is_empty() {
            return Err(EscrowError::InvalidParameters(
                "maker and taker addresses must be non-empty".to_string(),
            ));
        }
        params.timelocks.validate()?;

        let id = EscrowId::from(rand::random::<[u8; 16]>());
        let wallet_address = self.wallets.create_wallet(id).await?;

        // Testnet-only activation top-up; a missing faucet is config, not an
        // error, and a failed top-up is recoverable by funding normally.
        if let Some(reserve) = self.config.activation_reserve {
            if let Err(err) =
                self.ledger.ensure_funded(&wallet_address, U256::from(reserve)).await
            {
                warn!(%wallet_address, %err, "wallet activation top-up failed");
            }
        }

        let deployed_at = unix_now();
        let timelocks = params.timelocks.with_deployed_at(deployed_at);
        let escrow = Escrow {
            id,
            order_hash: params.order_hash,
            hashlock: params.hashlock,
            maker: params.maker,
            taker: params.taker,
            token: params.token,
            amount: params.amount,
            safety_deposit: params.safety_deposit,
            timelocks,
            deployed_at,
            wallet_address: wallet_address.clone(),
            status: EscrowStatus::Created,
            side: params.side,
            funding_tx_ids: BTreeSet::new(),
            secret: None,
            settlement_tx_ids: Vec::new(),
        };
        let response = CreateDstResponse {
            escrow_id: id,
            wallet_address,
            required_deposit: escrow.required_deposit(),
            timelocks: timelocks.into(),
        };
        self.storage.insert_escrow(escrow).await?;

        counter!(counters::ESCROWS_CREATED).increment(1);
        info!(escrow_id = %id, "escrow created");
        Ok(response)
    }

    /// Verifies deposits and flips the escrow to funded.
    #[instrument(skip_all, fields(escrow_id = %params.escrow_id))]
    pub async fn fund(&self, params: FundParameters) -> Result<FundResponse, EscrowError> {
        if params.tx_ids.is_empty() {
            return Err(EscrowError::InvalidParameters(
                "at least one funding transaction id is required".to_string(),
            ));
        }
        let tx_ids: BTreeSet<TxId> = params.tx_ids.iter().copied().collect();

        let lock = self.lock_for(params.escrow_id);
        let _guard = lock.lock().await;

        let mut escrow = self.read(params.escrow_id).await?;
        match escrow.status {
            EscrowStatus::Created => {}
            // Replaying an already-verified set is idempotent; anything else
            // would regress or double-count.
            EscrowStatus::Funded if tx_ids.is_subset(&escrow.funding_tx_ids) => {
                let (total, verified) = self.verify_deposits(&escrow, &tx_ids).await?;
                return Ok(FundResponse { total_received: total, verified_txs: verified });
            }
            status => return Err(EscrowError::InvalidState { status }),
        }

        let (total, verified) = self.verify_deposits(&escrow, &tx_ids).await?;
        let required = escrow.required_principal();
        if total < required {
            return Err(EscrowError::InsufficientFunding { received: total, required });
        }

        escrow.funding_tx_ids.extend(tx_ids);
        escrow.advance(EscrowStatus::Funded)?;
        self.storage.write_escrow(escrow).await?;

        counter!(counters::ESCROWS_FUNDED).increment(1);
        info!(escrow_id = %params.escrow_id, %total, "escrow funded");
        Ok(FundResponse { total_received: total, verified_txs: verified })
    }

    /// Resolves each deposit and sums deliveries in the principal asset.
    async fn verify_deposits(
        &self,
        escrow: &Escrow,
        tx_ids: &BTreeSet<TxId>,
    ) -> Result<(U256, Vec<TxId>), EscrowError> {
        let mut total = U256::ZERO;
        let mut verified = Vec::with_capacity(tx_ids.len());
        for &tx_id in tx_ids {
            let resolved = match self.ledger.resolve_tx(tx_id).await {
                Ok(resolved) => resolved,
                Err(LedgerError::TxNotFound(_)) => {
                    return Err(EscrowError::InvalidTransaction {
                        tx_id,
                        reason: "not found on the ledger".to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            };

            if !resolved.validated {
                return Err(EscrowError::InvalidTransaction {
                    tx_id,
                    reason: "not included in a validated ledger".to_string(),
                });
            }
            match resolved.kind {
                ResolvedTxKind::Payment => {}
                ResolvedTxKind::Other(kind) => {
                    return Err(EscrowError::InvalidTransaction {
                        tx_id,
                        reason: format!("expected a payment, got {kind}"),
                    });
                }
            }
            if resolved.destination.as_ref() != Some(&escrow.wallet_address) {
                return Err(EscrowError::InvalidTransaction {
                    tx_id,
                    reason: format!("destination is not the escrow wallet {}", escrow.wallet_address),
                });
            }

            if resolved.asset == escrow.token {
                total += resolved.delivered;
            }
            verified.push(tx_id);
        }
        Ok((total, verified))
    }

    /// Releases the principal to the maker against a valid secret.
    #[instrument(skip_all, fields(escrow_id = %params.escrow_id, is_public = params.is_public))]
    pub async fn withdraw(
        &self,
        params: WithdrawParameters,
    ) -> Result<WithdrawResponse, EscrowError> {
        let lock = self.lock_for(params.escrow_id);
        let _guard = lock.lock().await;

        let mut escrow = self.read(params.escrow_id).await?;
        if escrow.status != EscrowStatus::Funded {
            return Err(EscrowError::InvalidState { status: escrow.status });
        }
        // The hashlock check precedes any ledger interaction.
        if keccak256(params.secret) != escrow.hashlock {
            return Err(EscrowError::InvalidSecret);
        }
        if params.is_public {
            validate_window(
                &escrow.timelocks,
                Stage::DstPublicWithdrawal,
                Some(Stage::DstCancellation),
                self.config.withdrawal_slack,
            )?;
        } else {
            if params.caller_address != escrow.taker {
                return Err(EscrowError::Unauthorized(params.caller_address));
            }
            validate_window(
                &escrow.timelocks,
                Stage::DstWithdrawal,
                Some(Stage::DstCancellation),
                self.config.withdrawal_slack,
            )?;
        }

        let principal_tx = self
            .wallets
            .sign_and_submit(
                escrow.id,
                &escrow.wallet_address,
                &escrow.maker,
                &escrow.token,
                escrow.amount,
            )
            .await
            .map_err(|err| {
                counter!(counters::SETTLEMENT_FAILURES).increment(1);
                EscrowError::SettlementFailed(err)
            })?;
        escrow.settlement_tx_ids.push(principal_tx);

        if escrow.safety_deposit > U256::ZERO {
            match self
                .wallets
                .sign_and_submit(
                    escrow.id,
                    &escrow.wallet_address,
                    &params.caller_address,
                    &AssetId::Native,
                    escrow.safety_deposit,
                )
                .await
            {
                Ok(tx_id) => escrow.settlement_tx_ids.push(tx_id),
                // The principal already reached the maker; the remaining
                // balance stays recoverable through rescue.
                Err(err) => {
                    counter!(counters::SETTLEMENT_FAILURES).increment(1);
                    warn!(
                        escrow_id = %escrow.id,
                        caller = %params.caller_address,
                        %err,
                        "safety deposit transfer failed after principal payout, needs reconciliation"
                    );
                }
            }
        }

        escrow.secret = Some(params.secret);
        escrow.advance(EscrowStatus::Withdrawn)?;
        let amount = escrow.amount;
        self.storage.write_escrow(escrow).await?;

        counter!(counters::ESCROWS_WITHDRAWN).increment(1);
        info!(escrow_id = %params.escrow_id, tx = %principal_tx, "escrow withdrawn");
        Ok(WithdrawResponse { tx_hash: principal_tx, secret: params.secret, amount })
    }

    /// Refunds the deposit after the cancellation window opens.
    #[instrument(skip_all, fields(escrow_id = %params.escrow_id))]
    pub async fn cancel(&self, params: CancelParameters) -> Result<CancelResponse, EscrowError> {
        let lock = self.lock_for(params.escrow_id);
        let _guard = lock.lock().await;

        let mut escrow = self.read(params.escrow_id).await?;
        if escrow.status != EscrowStatus::Funded {
            return Err(EscrowError::InvalidState { status: escrow.status });
        }
        if params.caller_address != escrow.taker {
            return Err(EscrowError::Unauthorized(params.caller_address));
        }
        validate_window(
            &escrow.timelocks,
            Stage::DstCancellation,
            None,
            self.config.cancellation_slack,
        )?;

        // (recipient, asset, amount) legs of the refund.
        let mut legs: Vec<(LedgerAddress, AssetId, U256)> = Vec::with_capacity(2);
        match escrow.side {
            EscrowSide::Destination => {
                if escrow.token.is_native() {
                    legs.push((
                        escrow.taker.clone(),
                        AssetId::Native,
                        escrow.amount + escrow.safety_deposit,
                    ));
                } else {
                    legs.push((escrow.taker.clone(), escrow.token.clone(), escrow.amount));
                    if escrow.safety_deposit > U256::ZERO {
                        legs.push((escrow.taker.clone(), AssetId::Native, escrow.safety_deposit));
                    }
                }
            }
            EscrowSide::Source => {
                legs.push((escrow.maker.clone(), escrow.token.clone(), escrow.amount));
                if escrow.safety_deposit > U256::ZERO {
                    legs.push((escrow.taker.clone(), AssetId::Native, escrow.safety_deposit));
                }
            }
        }

        // Legs settled by an earlier interrupted cancel are resumed, never
        // re-sent. A funded escrow can only carry settlement ids written by
        // that earlier cancel, so they are the resume cursor.
        let completed = escrow.settlement_tx_ids.len();
        let mut refund_txs = escrow.settlement_tx_ids.clone();
        let mut total =
            legs.iter().take(completed).fold(U256::ZERO, |acc, (_, _, amount)| acc + *amount);
        for (to, asset, amount) in legs.into_iter().skip(completed) {
            match self
                .wallets
                .sign_and_submit(escrow.id, &escrow.wallet_address, &to, &asset, amount)
                .await
            {
                Ok(tx_id) => {
                    refund_txs.push(tx_id);
                    escrow.settlement_tx_ids.push(tx_id);
                    total += amount;
                }
                Err(err) => {
                    counter!(counters::SETTLEMENT_FAILURES).increment(1);
                    // Completed legs stay recorded so the next attempt skips
                    // them.
                    self.storage.write_escrow(escrow).await?;
                    return Err(EscrowError::SettlementFailed(err));
                }
            }
        }

        escrow.advance(EscrowStatus::Cancelled)?;
        self.storage.write_escrow(escrow).await?;

        counter!(counters::ESCROWS_CANCELLED).increment(1);
        info!(escrow_id = %params.escrow_id, %total, "escrow cancelled");
        Ok(CancelResponse { cancel_tx_ids: refund_txs, total_refunded: total })
    }

    /// Sweeps wallet balance to the taker after the rescue delay.
    ///
    /// Non-terminal escrows move to `Rescued`; escrows that already settled
    /// keep their status, a sweep of residual balance does not rewrite
    /// history.
    #[instrument(skip_all, fields(escrow_id = %params.escrow_id))]
    pub async fn rescue(&self, params: RescueParameters) -> Result<RescueResponse, EscrowError> {
        let lock = self.lock_for(params.escrow_id);
        let _guard = lock.lock().await;

        let mut escrow = self.read(params.escrow_id).await?;
        if params.caller_address != escrow.taker {
            return Err(EscrowError::Unauthorized(params.caller_address));
        }
        let available_at = escrow.deployed_at + self.config.rescue_delay.as_secs();
        if unix_now() < available_at {
            return Err(EscrowError::RescueNotAvailable {
                available_at: DateTime::<Utc>::from_timestamp(available_at as i64, 0)
                    .unwrap_or_default(),
            });
        }

        let tx_id = self
            .wallets
            .sign_and_submit(
                escrow.id,
                &escrow.wallet_address,
                &params.caller_address,
                &AssetId::Native,
                params.amount,
            )
            .await
            .map_err(|err| {
                counter!(counters::SETTLEMENT_FAILURES).increment(1);
                EscrowError::SettlementFailed(err)
            })?;

        escrow.settlement_tx_ids.push(tx_id);
        if !escrow.status.is_terminal() {
            escrow.advance(EscrowStatus::Rescued)?;
        }
        self.storage.write_escrow(escrow).await?;

        counter!(counters::ESCROWS_RESCUED).increment(1);
        info!(escrow_id = %params.escrow_id, amount = %params.amount, "escrow rescued");
        Ok(RescueResponse { tx_hash: tx_id, amount: params.amount })
    }

    /// Public view of an escrow record.
    pub async fn get(&self, id: EscrowId) -> Result<EscrowView, EscrowError> {
        Ok(EscrowView::from(&self.read(id).await?))
    }

    /// Health probe over the ledger connection and the store.
    pub async fn health(&self) -> Result<HealthResponse, EscrowError> {
        let connected = self.ledger.ping().await.is_ok();
        let storage_ok = self.storage.ping().await.is_ok();
        let active_escrows = self.storage.count_active().await?;
        Ok(HealthResponse {
            healthy: connected && storage_ok,
            connected,
            active_escrows,
            version: SHORT_VERSION.to_string(),
        })
    }
}
