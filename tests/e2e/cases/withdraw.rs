use crate::e2e::environment::{
    AMOUNT, Environment, SAFETY_DEPOSIT, default_create_params, maker, secret, taker,
};
use alloy::primitives::{B256, U256};
use escrow_relay::{
    rpc::EscrowApiClient,
    types::{
        AssetId, EscrowStatus, LedgerAddress, Timelocks,
        rpc::{FundParameters, WithdrawParameters},
    },
};
use std::time::Duration;

async fn funded_escrow(env: &Environment) -> eyre::Result<escrow_relay::types::EscrowId> {
    let created = env.create_default_escrow().await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;
    Ok(created.escrow_id)
}

/// Happy-path destination withdrawal: the taker reveals the secret inside
/// the private window, the maker receives the principal and the caller
/// the safety deposit.
#[tokio::test(flavor = "multi_thread")]
async fn taker_withdraws_inside_private_window() -> eyre::Result<()> {
    // Slack stands in for the 11 s clock advance past the window opening.
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(11);
    })
    .await?;
    let escrow_id = funded_escrow(&env).await?;

    let response = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await?;
    assert_eq!(response.amount, U256::from(AMOUNT));
    assert_eq!(response.secret, secret());

    let transfers = env.ledger.transfers();
    assert_eq!(transfers.len(), 2, "principal and safety deposit transfers expected");
    assert_eq!(transfers[0].to, maker());
    assert_eq!(transfers[0].amount, U256::from(AMOUNT));
    assert_eq!(transfers[0].asset, AssetId::Native);
    assert_eq!(transfers[0].tx_id, response.tx_hash);
    assert_eq!(transfers[1].to, taker());
    assert_eq!(transfers[1].amount, U256::from(SAFETY_DEPOSIT));

    let view = env.client.get_escrow(escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Withdrawn);
    assert_eq!(view.secret, Some(secret()), "the revealed secret must be reported");
    assert_eq!(view.settlement_tx_ids.len(), 2);

    Ok(())
}

/// A wrong secret is rejected before any ledger interaction.
#[tokio::test(flavor = "multi_thread")]
async fn invalid_secret_is_rejected_without_ledger_calls() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(11);
    })
    .await?;
    let escrow_id = funded_escrow(&env).await?;

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: B256::repeat_byte(0xEE),
            caller_address: taker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("hashlock"), "got: {err}");

    assert!(env.ledger.transfers().is_empty(), "no transfer may be issued for a bad secret");
    let view = env.client.get_escrow(escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);

    Ok(())
}

/// Withdrawal before the private window opens fails with a timing error.
#[tokio::test(flavor = "multi_thread")]
async fn premature_withdrawal_is_rejected() -> eyre::Result<()> {
    let env = Environment::setup().await?;
    let escrow_id = funded_escrow(&env).await?;

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not yet open"), "got: {err}");

    let view = env.client.get_escrow(escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded, "a timing failure must not change state");

    Ok(())
}

/// Only the taker may use the private window.
#[tokio::test(flavor = "multi_thread")]
async fn private_window_rejects_other_callers() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(11);
    })
    .await?;
    let escrow_id = funded_escrow(&env).await?;

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: maker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not authorized"), "got: {err}");

    Ok(())
}

/// Any caller may withdraw inside the public window; the safety deposit
/// goes to whoever executed.
#[tokio::test(flavor = "multi_thread")]
async fn anyone_withdraws_inside_public_window() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(55);
    })
    .await?;

    // A wider public window than the default schedule, so the scenario is
    // not sensitive to request latency.
    let mut params = default_create_params();
    params.timelocks = Timelocks::from_offsets(0, [10, 120, 121, 122, 10, 50, 101]);
    let created = env.client.create_dst(params).await?;
    let tx_id = env.seed_full_deposit(&created);
    env.client
        .fund(FundParameters { escrow_id: created.escrow_id, from_address: None, tx_ids: vec![tx_id] })
        .await?;
    let escrow_id = created.escrow_id;

    let executor = LedgerAddress::new("rExecutorE9dQBm7vnjn1MGng25587e1R6");
    env.client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: executor.clone(),
            is_public: true,
        })
        .await?;

    let transfers = env.ledger.transfers();
    assert_eq!(transfers[0].to, maker());
    assert_eq!(transfers[1].to, executor, "safety deposit rewards the executing caller");

    Ok(())
}

/// Once the cancellation phase starts the withdrawal window is closed.
#[tokio::test(flavor = "multi_thread")]
async fn withdrawal_window_closes_at_cancellation() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(150);
    })
    .await?;
    let escrow_id = funded_escrow(&env).await?;

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("window closed"), "got: {err}");

    Ok(())
}

/// Withdrawal requires a funded escrow.
#[tokio::test(flavor = "multi_thread")]
async fn withdrawal_requires_funded_status() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(11);
    })
    .await?;
    let created = env.create_default_escrow().await?;

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id: created.escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not permitted"), "got: {err}");

    Ok(())
}

/// A rejected principal transfer surfaces as a settlement failure and
/// leaves the escrow funded.
#[tokio::test(flavor = "multi_thread")]
async fn rejected_principal_transfer_keeps_escrow_funded() -> eyre::Result<()> {
    let env = Environment::setup_with(|config| {
        config.escrow.withdrawal_slack = Duration::from_secs(11);
    })
    .await?;
    let escrow_id = funded_escrow(&env).await?;
    env.ledger.set_reject_transfers(true);

    let err = env
        .client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("settlement failed"), "got: {err}");

    let view = env.client.get_escrow(escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Funded);
    assert!(view.secret.is_none());

    // The same command succeeds once the ledger accepts transfers again.
    env.ledger.set_reject_transfers(false);
    env.client
        .withdraw(WithdrawParameters {
            escrow_id,
            secret: secret(),
            caller_address: taker(),
            is_public: false,
        })
        .await?;
    let view = env.client.get_escrow(escrow_id).await?;
    assert_eq!(view.status, EscrowStatus::Withdrawn);

    Ok(())
}
