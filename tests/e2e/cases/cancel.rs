use crate::e2e::environment::{
    AMOUNT, Environment, SAFETY_DEPOSIT, default_create_params, maker, taker,
};
use alloy::primitives::U256;
use escrow_relay::{
    rpc::EscrowApiClient,
    types::{
        AssetId, EscrowSide, EscrowStatus, LedgerAddress,
        rpc::{CancelParameters, FundParameters},
    },
};
use std::time::Duration;

/// Destination-side cancellation refunds principal and safety deposit to
/// the taker in a single transfer.
#[tokio::test(flavor = "multi_thread")]
async fn destination_cancel_refunds_taker_in_one_transfer() -> eyre::Result<()> {
    // Slack stands in for the 125 s clock advance past dst cancellation.
    let env = Environment::setup_with(|config| {
        config.escrow.cancellation_slack = Duration::from_secs(125);
    })
    .await?;
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;

    let cancelled = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await?;
    assert_eq!(cancelled.total_refunded, U256::from(AMOUNT + SAFETY_DEPOSIT));
    assert_eq!(cancelled.cancel_tx_ids.len(), 1, "native refund travels as one transfer");

    let transfers = env.ledger.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].to, taker());
    assert_eq!(transfers[0].amount, U256::from(AMOUNT + SAFETY_DEPOSIT));

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Cancelled);

    Ok(())
}

/// Source-side cancellation returns the principal to the maker and the
/// safety deposit to the taker as separate transfers.
#[tokio::test(flavor = "multi_thread")]
async fn source_cancel_splits_refund() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.cancellation_slack = Duration::from_secs(125);
    })
    .await?;

    let mut params = default_create_params();
    params.side = EscrowSide::Source;
    let created = env.client.create_dst(params).await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;

    let cancelled = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await?;
    assert_eq!(cancelled.cancel_tx_ids.len(), 2);
    assert_eq!(cancelled.total_refunded, U256::from(AMOUNT + SAFETY_DEPOSIT));

    let transfers = env.ledger.transfers();
    assert_eq!(transfers[0].to, maker());
    assert_eq!(transfers[0].amount, U256::from(AMOUNT));
    assert_eq!(transfers[1].to, taker());
    assert_eq!(transfers[1].amount, U256::from(SAFETY_DEPOSIT));
    assert_eq!(transfers[1].asset, AssetId::Native);

    Ok(())
}

/// A refund interrupted mid-settlement resumes from the remaining legs;
/// legs that already settled are never re-sent.
#[tokio::test(flavor = "multi_thread")]
async fn interrupted_cancel_resumes_without_repaying() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.cancellation_slack = Duration::from_secs(125);
    })
    .await?;

    // A source-side escrow refunds in two legs: principal to the maker,
    // safety deposit to the taker.
    let mut params = default_create_params();
    params.side = EscrowSide::Source;
    let created = env.client.create_dst(params).await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;

    // The ledger accepts the first leg and rejects the second.
    env.ledger.reject_transfers_after(1);
    let err = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("settlement failed"), "got: {err}");

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);
    assert_eq!(view.settlement_tx_ids.len(), 1, "the settled leg must be recorded");

    // The retry completes the refund from the remaining leg only.
    env.ledger.set_reject_transfers(false);
    let cancelled = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await?;
    assert_eq!(cancelled.cancel_tx_ids.len(), 2);
    assert_eq!(cancelled.total_refunded, U256::from(AMOUNT + SAFETY_DEPOSIT));

    let transfers = env.ledger.transfers();
    assert_eq!(transfers.len(), 2, "the settled principal leg must not be re-sent");
    assert_eq!(transfers[0].to, maker());
    assert_eq!(transfers[0].amount, U256::from(AMOUNT));
    assert_eq!(transfers[1].to, taker());
    assert_eq!(transfers[1].amount, U256::from(SAFETY_DEPOSIT));

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Cancelled);

    Ok(())
}

/// Only the taker may cancel.
#[tokio::test(flavor = "multi_thread")]
async fn cancel_rejects_non_taker_callers() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.cancellation_slack = Duration::from_secs(125);
    })
    .await?;
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;

    for caller in [maker(), LedgerAddress::new("rRandomCallerbpcbGtGziXwBQv5aXnDQ")] {
        let err = env
            .client
            .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: caller })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not authorized"), "got: {err}");
    }

    Ok(())
}

/// Cancellation before its window opens fails with a timing error.
#[tokio::test(flavor = "multi_thread")]
async fn cancel_before_window_is_rejected() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;

    let err = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not yet open"), "got: {err}");

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);

    Ok(())
}

/// Cancellation requires a funded escrow.
#[tokio::test(flavor = "multi_thread")]
async fn cancel_requires_funded_status() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.cancellation_slack = Duration::from_secs(125);
    })
    .await?;
    let created = env.create_default_escrow().await?;

    let err = env
        .client
        .cancel(CancelParameters { escrow_id: created.escrow_id, caller_address: taker() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not permitted"), "got: {err}");

    Ok(())
}
