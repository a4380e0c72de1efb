//! XRPL ledger adapter.
//!
//! Speaks JSON-RPC to a rippled HTTP endpoint (`tx`, `account_info`,
//! `account_lines`, `submit`, `server_info`). Wallet keys are generated
//! locally from OS entropy; transaction signing is delegated to the
//! endpoint's sign-and-submit mode, which keeps the adapter free of the
//! XRPL binary codec.

use super::api::{LedgerApi, ResolvedTx, ResolvedTxKind, Result, WalletSecret};
use crate::{
    constants::{LEDGER_BACKOFF_BASE, LEDGER_READ_ATTEMPTS, VALIDATION_POLL_INTERVAL},
    error::LedgerError,
    types::{AssetId, LedgerAddress, TxId},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use rand::{RngCore, rngs::OsRng};
use ripemd::Ripemd160;
use serde_json::{Value, json};
use sha2::{Digest, Sha256, Sha512};
use std::{str::FromStr, time::Duration};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Version prefix of an ed25519 family seed (`sEd…`).
const SEED_PREFIX_ED25519: [u8; 3] = [0x01, 0xE1, 0x4B];
/// Version prefix of a classic account address (`r…`).
const ACCOUNT_ID_PREFIX: u8 = 0x00;
/// Key-type prefix of an ed25519 public key on the XRPL.
const PUBKEY_PREFIX_ED25519: u8 = 0xED;

/// [`LedgerApi`] implementation backed by a rippled JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct XrplLedger {
    client: reqwest::Client,
    endpoint: Url,
    faucet: Option<Url>,
    request_timeout: Duration,
}

impl XrplLedger {
    /// Creates an adapter for `endpoint`, optionally backed by a testnet
    /// faucet for wallet activation.
    pub fn new(endpoint: Url, faucet: Option<Url>, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, endpoint, faucet, request_timeout }
    }

    /// Issues a single JSON-RPC call and unwraps the `result` envelope.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({ "method": method, "params": [params] });
        let response = self.client.post(self.endpoint.clone()).json(&body).send().await?;
        let envelope: Value = response.json().await?;
        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerError::InvalidResponse(format!("no result for `{method}`")))
    }

    /// Issues an idempotent read, retrying transport failures with
    /// exponential backoff.
    async fn read(&self, method: &str, params: Value) -> Result<Value> {
        let mut backoff = LEDGER_BACKOFF_BASE;
        let mut last = None;
        for attempt in 0..LEDGER_READ_ATTEMPTS {
            match self.call(method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(err @ (LedgerError::Unavailable(_) | LedgerError::Timeout)) => {
                    debug!(method, attempt, %err, "ledger read failed, retrying");
                    last = Some(err);
                    sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(err),
            }
        }
        Err(last.unwrap_or(LedgerError::Timeout))
    }

    /// Extracts the rippled error code from a `result`, if any.
    fn error_code(result: &Value) -> Option<&str> {
        (result.get("status").and_then(Value::as_str) == Some("error"))
            .then(|| result.get("error").and_then(Value::as_str))
            .flatten()
    }

    /// A transaction field, accommodating both flat (api v1) and
    /// `tx_json`-nested (api v2) response shapes.
    fn tx_field<'a>(result: &'a Value, key: &str) -> Option<&'a Value> {
        result.get(key).or_else(|| result.get("tx_json").and_then(|tx| tx.get(key)))
    }

    /// Parses a rippled amount: a string of drops for XRP, an object for
    /// issued currencies.
    fn parse_amount(value: &Value) -> Result<(AssetId, U256)> {
        match value {
            Value::String(drops) => Ok((AssetId::Native, parse_units(drops)?)),
            Value::Object(issued) => {
                let currency = issued
                    .get("currency")
                    .and_then(Value::as_str)
                    .ok_or_else(|| LedgerError::InvalidResponse("amount without currency".into()))?;
                let issuer = issued
                    .get("issuer")
                    .and_then(Value::as_str)
                    .ok_or_else(|| LedgerError::InvalidResponse("amount without issuer".into()))?;
                let amount = issued
                    .get("value")
                    .and_then(Value::as_str)
                    .ok_or_else(|| LedgerError::InvalidResponse("amount without value".into()))?;
                Ok((
                    AssetId::Issued {
                        currency: currency.to_string(),
                        issuer: LedgerAddress::new(issuer),
                    },
                    parse_units(amount)?,
                ))
            }
            other => Err(LedgerError::InvalidResponse(format!("unexpected amount `{other}`"))),
        }
    }

    /// Renders an amount in the shape rippled expects.
    fn amount_json(asset: &AssetId, amount: U256) -> Value {
        match asset {
            AssetId::Native => Value::String(amount.to_string()),
            AssetId::Issued { currency, issuer } => json!({
                "currency": currency,
                "issuer": issuer.as_str(),
                "value": amount.to_string(),
            }),
        }
    }

    /// Polls `tx` until the transaction reaches a validated ledger with a
    /// success result.
    async fn wait_for_validated(&self, tx_id: TxId) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.request_timeout;
        loop {
            match self.resolve_raw(tx_id).await {
                Ok(result) if result.get("validated").and_then(Value::as_bool) == Some(true) => {
                    let outcome = result
                        .get("meta")
                        .and_then(|meta| meta.get("TransactionResult"))
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if outcome == "tesSUCCESS" {
                        return Ok(());
                    }
                    return Err(LedgerError::Rejected(outcome.to_string()));
                }
                // Not yet in a validated ledger; keep polling.
                Ok(_) | Err(LedgerError::TxNotFound(_)) => {}
                Err(err) => return Err(err),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(LedgerError::Timeout);
            }
            sleep(VALIDATION_POLL_INTERVAL).await;
        }
    }

    async fn resolve_raw(&self, tx_id: TxId) -> Result<Value> {
        let result =
            self.read("tx", json!({ "transaction": format!("{tx_id:x}"), "binary": false })).await?;
        match Self::error_code(&result) {
            Some("txnNotFound") => Err(LedgerError::TxNotFound(tx_id)),
            Some(code) => Err(LedgerError::Unavailable(format!("tx lookup failed: {code}"))),
            None => Ok(result),
        }
    }
}

#[async_trait]
impl LedgerApi for XrplLedger {
    async fn generate_wallet(&self) -> Result<(LedgerAddress, WalletSecret)> {
        let mut entropy = [0u8; 16];
        OsRng.fill_bytes(&mut entropy);
        Ok((derive_address(&entropy), WalletSecret::new(encode_seed(&entropy))))
    }

    async fn ensure_funded(&self, address: &LedgerAddress, min: U256) -> Result<()> {
        if self.read_balance(address, &AssetId::Native).await? >= min {
            return Ok(());
        }
        let Some(faucet) = &self.faucet else {
            return Err(LedgerError::FaucetUnavailable);
        };

        self.client
            .post(faucet.clone())
            .json(&json!({ "destination": address.as_str() }))
            .send()
            .await?
            .error_for_status()
            .map_err(|err| LedgerError::Unavailable(format!("faucet request failed: {err}")))?;

        // Faucet payments land asynchronously; poll until the balance shows.
        let deadline = tokio::time::Instant::now() + self.request_timeout;
        loop {
            if self.read_balance(address, &AssetId::Native).await? >= min {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(LedgerError::Timeout);
            }
            sleep(VALIDATION_POLL_INTERVAL).await;
        }
    }

    async fn resolve_tx(&self, tx_id: TxId) -> Result<ResolvedTx> {
        let result = self.resolve_raw(tx_id).await?;

        let kind = match Self::tx_field(&result, "TransactionType").and_then(Value::as_str) {
            Some("Payment") => ResolvedTxKind::Payment,
            Some(other) => ResolvedTxKind::Other(other.to_string()),
            None => {
                return Err(LedgerError::InvalidResponse("transaction without a type".into()));
            }
        };
        let destination = Self::tx_field(&result, "Destination")
            .and_then(Value::as_str)
            .map(LedgerAddress::new);
        let validated = result.get("validated").and_then(Value::as_bool).unwrap_or(false);

        // `delivered_amount` is authoritative; the nominal `Amount` field can
        // overstate what a partial payment actually moved.
        let (asset, delivered) = match result
            .get("meta")
            .and_then(|meta| meta.get("delivered_amount"))
        {
            Some(delivered) => Self::parse_amount(delivered)?,
            None => (AssetId::Native, U256::ZERO),
        };

        Ok(ResolvedTx { kind, destination, asset, delivered, validated })
    }

    async fn read_balance(&self, address: &LedgerAddress, asset: &AssetId) -> Result<U256> {
        match asset {
            AssetId::Native => {
                let result = self
                    .read(
                        "account_info",
                        json!({ "account": address.as_str(), "ledger_index": "validated" }),
                    )
                    .await?;
                match Self::error_code(&result) {
                    // An unactivated account holds nothing.
                    Some("actNotFound") => Ok(U256::ZERO),
                    Some(code) => {
                        Err(LedgerError::Unavailable(format!("account_info failed: {code}")))
                    }
                    None => {
                        let drops = result
                            .get("account_data")
                            .and_then(|data| data.get("Balance"))
                            .and_then(Value::as_str)
                            .ok_or_else(|| {
                                LedgerError::InvalidResponse("account_info without Balance".into())
                            })?;
                        parse_units(drops)
                    }
                }
            }
            AssetId::Issued { currency, issuer } => {
                let result = self
                    .read(
                        "account_lines",
                        json!({ "account": address.as_str(), "ledger_index": "validated" }),
                    )
                    .await?;
                if let Some("actNotFound") = Self::error_code(&result) {
                    return Ok(U256::ZERO);
                }
                let lines = result
                    .get("lines")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        LedgerError::InvalidResponse("account_lines without lines".into())
                    })?;
                let balance = lines
                    .iter()
                    .find(|line| {
                        line.get("currency").and_then(Value::as_str) == Some(currency)
                            && line.get("account").and_then(Value::as_str) == Some(issuer.as_str())
                    })
                    .and_then(|line| line.get("balance").and_then(Value::as_str));
                match balance {
                    Some(value) => parse_units(value),
                    None => Ok(U256::ZERO),
                }
            }
        }
    }

    async fn submit_transfer(
        &self,
        secret: &WalletSecret,
        from: &LedgerAddress,
        to: &LedgerAddress,
        asset: &AssetId,
        amount: U256,
    ) -> Result<TxId> {
        let tx_json = json!({
            "TransactionType": "Payment",
            "Account": from.as_str(),
            "Destination": to.as_str(),
            "Amount": Self::amount_json(asset, amount),
        });
        let result = self
            .call(
                "submit",
                json!({ "tx_json": tx_json, "secret": secret.reveal(), "fail_hard": true }),
            )
            .await?;
        if let Some(code) = Self::error_code(&result) {
            if code == "badSecret" || code == "badSeed" {
                return Err(LedgerError::Signing(code.to_string()));
            }
            return Err(LedgerError::Rejected(code.to_string()));
        }

        let engine = result.get("engine_result").and_then(Value::as_str).unwrap_or_default();
        // tes: applied; ter: queued for a later ledger, worth waiting on.
        if engine != "tesSUCCESS" && !engine.starts_with("ter") {
            let detail = result
                .get("engine_result_message")
                .and_then(Value::as_str)
                .unwrap_or(engine);
            return Err(LedgerError::Rejected(format!("{engine}: {detail}")));
        }

        let hash = result
            .get("tx_json")
            .and_then(|tx| tx.get("hash"))
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::InvalidResponse("submit result without hash".into()))?;
        let tx_id = TxId::from_str(&format!("0x{hash}"))
            .map_err(|err| LedgerError::InvalidResponse(format!("bad tx hash `{hash}`: {err}")))?;

        self.wait_for_validated(tx_id).await?;
        Ok(tx_id)
    }

    async fn ping(&self) -> Result<()> {
        let result = self.read("server_info", json!({})).await?;
        if let Some(code) = Self::error_code(&result) {
            warn!(code, "ledger endpoint reported an error on server_info");
            return Err(LedgerError::Unavailable(code.to_string()));
        }
        Ok(())
    }
}

/// Parses a non-negative integer amount in smallest units.
///
/// Issued-currency balances can carry a sign and a fractional part on the
/// wire; the coordinator only deals in whole smallest units.
fn parse_units(raw: &str) -> Result<U256> {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let integral = match unsigned.split_once('.') {
        Some((integral, fraction)) if fraction.chars().all(|c| c == '0') => integral,
        Some(_) => {
            return Err(LedgerError::InvalidResponse(format!("fractional amount `{raw}`")));
        }
        None => unsigned,
    };
    U256::from_str_radix(integral, 10)
        .map_err(|err| LedgerError::InvalidResponse(format!("bad amount `{raw}`: {err}")))
}

/// Encodes 16 bytes of entropy as an ed25519 family seed (`sEd…`).
fn encode_seed(entropy: &[u8; 16]) -> String {
    let mut payload = Vec::with_capacity(SEED_PREFIX_ED25519.len() + entropy.len());
    payload.extend_from_slice(&SEED_PREFIX_ED25519);
    payload.extend_from_slice(entropy);
    bs58::encode(payload).with_alphabet(bs58::Alphabet::RIPPLE).with_check().into_string()
}

/// Derives the classic address of the ed25519 account seeded by `entropy`.
///
/// The raw signing key is the first half of SHA-512 over the entropy; the
/// account id is RIPEMD-160 over SHA-256 of the prefixed public key.
fn derive_address(entropy: &[u8; 16]) -> LedgerAddress {
    let digest = Sha512::digest(entropy);
    let mut private = [0u8; 32];
    private.copy_from_slice(&digest[..32]);

    let verifying = SigningKey::from_bytes(&private).verifying_key();
    let mut prefixed = Vec::with_capacity(33);
    prefixed.push(PUBKEY_PREFIX_ED25519);
    prefixed.extend_from_slice(verifying.as_bytes());

    let account_id = Ripemd160::digest(Sha256::digest(&prefixed));
    let mut payload = Vec::with_capacity(21);
    payload.push(ACCOUNT_ID_PREFIX);
    payload.extend_from_slice(&account_id);

    LedgerAddress::new(
        bs58::encode(payload).with_alphabet(bs58::Alphabet::RIPPLE).with_check().into_string(),
    )
}
