//! The `escrow_` namespace.
//!
//! Typed command surface of the coordinator. Commands are validated once
//! at this boundary; everything behind it operates on typed structs only.

use crate::{
    escrow::EscrowService,
    types::{
        EscrowId,
        rpc::{
            CancelParameters, CancelResponse, CreateDstParameters, CreateDstResponse, EscrowView,
            FundParameters, FundResponse, HealthResponse, RescueParameters, RescueResponse,
            WithdrawParameters, WithdrawResponse,
        },
    },
};
use jsonrpsee::{
    core::{RpcResult, async_trait},
    proc_macros::rpc,
};

/// Escrow coordinator `escrow_` RPC namespace.
#[rpc(server, client, namespace = "escrow")]
pub trait EscrowApi {
    /// Creates an escrow and returns its funding address and schedule.
    #[method(name = "createDst")]
    async fn create_dst(&self, parameters: CreateDstParameters) -> RpcResult<CreateDstResponse>;

    /// Verifies deposit transactions and marks the escrow as funded.
    #[method(name = "fund")]
    async fn fund(&self, parameters: FundParameters) -> RpcResult<FundResponse>;

    /// Releases the principal to the maker against the hashlock preimage.
    #[method(name = "withdraw")]
    async fn withdraw(&self, parameters: WithdrawParameters) -> RpcResult<WithdrawResponse>;

    /// Refunds the deposit once the cancellation window is open.
    #[method(name = "cancel")]
    async fn cancel(&self, parameters: CancelParameters) -> RpcResult<CancelResponse>;

    /// Sweeps residual wallet balance after the rescue delay.
    #[method(name = "rescue")]
    async fn rescue(&self, parameters: RescueParameters) -> RpcResult<RescueResponse>;

    /// Public view of an escrow record. Never exposes key material.
    #[method(name = "getEscrow")]
    async fn get_escrow(&self, escrow_id: EscrowId) -> RpcResult<EscrowView>;

    /// Checks the health of the coordinator.
    #[method(name = "health")]
    async fn health(&self) -> RpcResult<HealthResponse>;
}

/// [`EscrowApi`] implementation on top of [`EscrowService`].
#[derive(Debug)]
pub struct EscrowRpc {
    service: EscrowService,
}

impl EscrowRpc {
    /// Creates the RPC module over a service instance.
    pub fn new(service: EscrowService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EscrowApiServer for EscrowRpc {
    async fn create_dst(&self, parameters: CreateDstParameters) -> RpcResult<CreateDstResponse> {
        Ok(self.service.create(parameters).await?)
    }

    async fn fund(&self, parameters: FundParameters) -> RpcResult<FundResponse> {
        Ok(self.service.fund(parameters).await?)
    }

    async fn withdraw(&self, parameters: WithdrawParameters) -> RpcResult<WithdrawResponse> {
        Ok(self.service.withdraw(parameters).await?)
    }

    async fn cancel(&self, parameters: CancelParameters) -> RpcResult<CancelResponse> {
        Ok(self.service.cancel(parameters).await?)
    }

    async fn rescue(&self, parameters: RescueParameters) -> RpcResult<RescueResponse> {
        Ok(self.service.rescue(parameters).await?)
    }

    async fn get_escrow(&self, escrow_id: EscrowId) -> RpcResult<EscrowView> {
        Ok(self.service.get(escrow_id).await?)
    }

    async fn health(&self) -> RpcResult<HealthResponse> {
        Ok(self.service.health().await?)
    }
}
