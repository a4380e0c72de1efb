use crate::e2e::environment::{AMOUNT, Environment, SAFETY_DEPOSIT};
use alloy::primitives::U256;
use escrow_relay::{
    rpc::EscrowApiClient,
    types::{AssetId, EscrowStatus, LedgerAddress, rpc::FundParameters},
};

/// A single covering deposit flips the escrow to funded.
#[tokio::test(flavor = "multi_thread")]
async fn fund_with_single_covering_tx() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);

    let funded = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;
    assert_eq!(funded.total_received, U256::from(AMOUNT + SAFETY_DEPOSIT));
    assert_eq!(funded.verified_txs, vec![tx_id]);

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);
    assert_eq!(view.funding_tx_ids, vec![tx_id]);

    Ok(())
}

/// Under-funding is rejected; a third transaction closing the gap funds
/// the escrow with all three deposits recorded.
#[tokio::test(flavor = "multi_thread")]
async fn multi_tx_funding_completes_once_covered() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;
    let required = AMOUNT + SAFETY_DEPOSIT;

    let first = env.ledger.seed_payment(
        &created.wallet_address,
        AssetId::Native,
        U256::from(required / 2),
    );
    let second = env.ledger.seed_payment(
        &created.wallet_address,
        AssetId::Native,
        U256::from(required - required / 2 - 1),
    );

    let err = env
        .client
        .fund(FundParameters {
            escrow_id: created.escrow_id,
            from_address: None,
            tx_ids: vec![first, second],
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("insufficient funding"), "got: {err}");

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Created, "rejected funding must not advance status");

    let third = env.ledger.seed_payment(&created.wallet_address, AssetId::Native, U256::from(1u64));
    let funded = env
        .client
        .fund(FundParameters {
            escrow_id: created.escrow_id,
            from_address: None,
            tx_ids: vec![first, second, third],
        })
        .await?;
    assert_eq!(funded.total_received, U256::from(required));
    assert_eq!(funded.verified_txs.len(), 3);

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);
    assert_eq!(view.funding_tx_ids.len(), 3);

    Ok(())
}

/// Deposits to the wrong destination fail verification.
#[tokio::test(flavor = "multi_thread")]
async fn fund_rejects_wrong_destination() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;

    let stray = env.ledger.seed_payment(
        &LedgerAddress::new("rSomeoneElse1111111111111111111111"),
        AssetId::Native,
        U256::from(AMOUNT + SAFETY_DEPOSIT),
    );
    let err = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![stray] })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("destination"), "got: {err}");

    Ok(())
}

/// Non-payment transactions fail verification.
#[tokio::test(flavor = "multi_thread")]
async fn fund_rejects_non_payment_txs() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;

    let tx_id = env.ledger.seed_non_payment(&created.wallet_address);
    let err = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("payment"), "got: {err}");

    Ok(())
}

/// Unvalidated transactions fail verification.
#[tokio::test(flavor = "multi_thread")]
async fn fund_rejects_unvalidated_txs() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;

    let tx_id = env.ledger.seed_unvalidated_payment(
        &created.wallet_address,
        AssetId::Native,
        U256::from(AMOUNT + SAFETY_DEPOSIT),
    );
    let err = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("validated"), "got: {err}");

    Ok(())
}

/// Replaying the same deposit set is idempotent; listing the same id
/// twice does not double-count.
#[tokio::test(flavor = "multi_thread")]
async fn fund_is_idempotent() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);

    // The same id twice counts once.
    let funded = env
        .client
        .fund(FundParameters {
            escrow_id: created.escrow_id,
            from_address: None,
            tx_ids: vec![tx_id, tx_id],
        })
        .await?;
    assert_eq!(funded.total_received, U256::from(AMOUNT + SAFETY_DEPOSIT));
    assert_eq!(funded.verified_txs.len(), 1);

    // Replaying the verified set succeeds without regressing status.
    let replay = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;
    assert_eq!(replay.total_received, U256::from(AMOUNT + SAFETY_DEPOSIT));

    let view = env.client.get_escrow(created.escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);
    assert_eq!(view.funding_tx_ids, vec![tx_id]);

    // A new deposit on an already-funded escrow is not accepted.
    let late = env.seed_full_deposit(&created);
    let err = env
        .client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![late] })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not permitted"), "got: {err}");

    Ok(())
}
