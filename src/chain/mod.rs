//! Chain collaborator
//!
//! The pipeline talks to the chain only through `ChainClient`: plain reads,
//! a raw `eth_call`, and transaction submission. `RpcChain` is the alloy-backed
//! implementation. Tests substitute an in-memory mock.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

pub mod rpc;

#[cfg(test)]
pub(crate) mod mock;

pub use rpc::RpcChain;

use crate::error::HarvestResult;
use crate::types::{SubmittedTx, TxRequest};
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

/// Chain read/write interface consumed by the pipeline.
///
/// Read failures come back as `HarvestError::Provider`; each caller substitutes
/// its own neutral default (fallback gas price, skipped pool).
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_latest_block(&self) -> HarvestResult<u64>;

    /// Native balance of `address` in wei
    async fn get_balance(&self, address: Address) -> HarvestResult<U256>;

    /// Current gas price in wei
    async fn get_gas_price(&self) -> HarvestResult<u128>;

    /// Read-only contract call with ABI-encoded calldata
    async fn call(&self, to: Address, data: Bytes) -> HarvestResult<Bytes>;

    /// Sign and broadcast. In dry run mode this never touches the network
    /// and returns the all-zero hash.
    async fn send_transaction(&self, request: TxRequest) -> HarvestResult<SubmittedTx>;

    /// Address of the configured signer, if any
    fn sender(&self) -> Option<Address>;
}
