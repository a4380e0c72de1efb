//! Escrow relay end-to-end test environment.

use alloy::primitives::{B256, U256, keccak256};
use escrow_relay::{
    config::CoordinatorConfig,
    ledger::{InMemoryLedger, Ledger},
    rpc::EscrowApiClient,
    spawn::{CoordinatorHandle, try_spawn},
    types::{
        AssetId, EscrowSide, LedgerAddress, Timelocks, TxId,
        rpc::{CreateDstParameters, CreateDstResponse},
    },
};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use std::sync::Arc;

/// Principal used by the scenarios, in drops.
pub const AMOUNT: u64 = 1_000_000;
/// Safety deposit used by the scenarios, in drops.
pub const SAFETY_DEPOSIT: u64 = 100_000;
/// Phase offsets in slot order: source withdrawal through destination
/// cancellation.
pub const PHASE_OFFSETS: [u32; 7] = [10, 120, 121, 122, 10, 100, 101];

/// The withdrawal secret used by the happy-path scenarios.
pub fn secret() -> B256 {
    B256::repeat_byte(0x42)
}

/// keccak-256 of [`secret`].
pub fn hashlock() -> B256 {
    keccak256(secret())
}

/// The maker address used by the scenarios.
pub fn maker() -> LedgerAddress {
    LedgerAddress::new("rMakerQkbzsHrfAkBZjjqFSxSKKoQLcjCJ")
}

/// The taker address used by the scenarios.
pub fn taker() -> LedgerAddress {
    LedgerAddress::new("rTakerf1XjUnYiTFdkSuWnvyvnUhJzVWWb")
}

/// Escrow creation parameters shared by the scenarios.
pub fn default_create_params() -> CreateDstParameters {
    CreateDstParameters {
        order_hash: B256::repeat_byte(0x11),
        hashlock: hashlock(),
        maker: maker(),
        taker: taker(),
        token: AssetId::Native,
        amount: U256::from(AMOUNT),
        safety_deposit: U256::from(SAFETY_DEPOSIT),
        timelocks: Timelocks::from_offsets(0, PHASE_OFFSETS),
        side: EscrowSide::Destination,
    }
}

/// A running coordinator over an in-memory ledger, driven through the
/// real RPC surface.
pub struct Environment {
    /// The ledger backend, for seeding deposits and inspecting transfers.
    pub ledger: Arc<InMemoryLedger>,
    /// HTTP client pointed at the coordinator.
    pub client: HttpClient,
    _handle: CoordinatorHandle,
}

impl Environment {
    /// Sets up a coordinator with the default configuration.
    pub async fn setup() -> eyre::Result<Self> {
        Self::setup_with(|_| {}).await
    }

    /// Sets up a coordinator with an adjusted configuration.
    pub async fn setup_with(
        adjust: impl FnOnce(&mut CoordinatorConfig),
    ) -> eyre::Result<Self> {
        let mut config = CoordinatorConfig::default();
        config.server.port = 0;
        config.server.metrics_port = 0;
        adjust(&mut config);

        let ledger = Arc::new(InMemoryLedger::new());
        let handle = try_spawn(config, Ledger::new(ledger.clone())).await?;
        let client = HttpClientBuilder::default().build(format!("http://{}", handle.http_addr))?;

        Ok(Self { ledger, client, _handle: handle })
    }

    /// Creates an escrow with [`default_create_params`].
    pub async fn create_default_escrow(&self) -> eyre::Result<CreateDstResponse> {
        Ok(self.client.create_dst(default_create_params()).await?)
    }

    /// Seeds a validated deposit covering the full required amount.
    pub fn seed_full_deposit(&self, created: &CreateDstResponse) -> TxId {
        self.ledger.seed_payment(
            &created.wallet_address,
            AssetId::Native,
            U256::from(AMOUNT + SAFETY_DEPOSIT),
        )
    }
}
