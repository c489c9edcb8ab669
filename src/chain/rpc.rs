//! alloy-backed chain client
//!
//! Connects over HTTP or WebSocket depending on the RPC URL scheme. The
//! provider carries a local wallet when a private key is configured, so
//! nonce, chain id and signing are handled by alloy's fillers.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use super::ChainClient;
use crate::config::HarvesterConfig;
use crate::error::{HarvestError, HarvestResult};
use crate::types::{SubmittedTx, TxRequest};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};

pub struct RpcChain {
    provider: DynProvider,
    signer_address: Option<Address>,
    dry_run: bool,
}

impl RpcChain {
    /// Connect using the configured RPC URL and optional private key
    pub async fn connect(config: &HarvesterConfig) -> HarvestResult<Self> {
        let signer = match config.private_key.as_deref() {
            Some(key) => Some(key.trim().parse::<PrivateKeySigner>().map_err(|e| {
                HarvestError::Configuration(format!("invalid PRIVATE_KEY: {}", e))
            })?),
            None => None,
        };
        let signer_address = signer.as_ref().map(|s| s.address());

        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect(&config.rpc_url)
                .await
                .map_err(HarvestError::provider)?
                .erased(),
            None => ProviderBuilder::new()
                .connect(&config.rpc_url)
                .await
                .map_err(HarvestError::provider)?
                .erased(),
        };

        if let Some(addr) = signer_address {
            info!("Wallet loaded: {}", addr);
        }

        Ok(Self {
            provider,
            signer_address,
            dry_run: config.dry_run,
        })
    }
}

#[async_trait]
impl ChainClient for RpcChain {
    async fn get_latest_block(&self) -> HarvestResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(HarvestError::provider)
    }

    async fn get_balance(&self, address: Address) -> HarvestResult<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(HarvestError::provider)
    }

    async fn get_gas_price(&self) -> HarvestResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(HarvestError::provider)
    }

    async fn call(&self, to: Address, data: Bytes) -> HarvestResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(tx).await.map_err(HarvestError::provider)
    }

    async fn send_transaction(&self, request: TxRequest) -> HarvestResult<SubmittedTx> {
        if self.dry_run {
            info!(
                "DRY RUN: Would send transaction to {} (gas {} @ {} wei)",
                request.to, request.gas_limit, request.gas_price
            );
            return Ok(SubmittedTx::dry_run());
        }

        let from = self.signer_address.ok_or_else(|| {
            HarvestError::Configuration("No private key configured for live transactions".to_string())
        })?;

        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => self
                .provider
                .get_transaction_count(from)
                .await
                .map_err(HarvestError::provider)?,
        };

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(request.to)
            .with_value(request.value)
            .with_gas_limit(request.gas_limit)
            .with_gas_price(request.gas_price)
            .with_input(request.data)
            .with_chain_id(request.chain_id)
            .with_nonce(nonce);

        debug!("Submitting tx from {} nonce {}", from, nonce);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(HarvestError::provider)?;
        let hash = *pending.tx_hash();

        info!("Transaction sent: {}", hash);
        Ok(SubmittedTx {
            hash,
            dry_run: false,
        })
    }

    fn sender(&self) -> Option<Address> {
        self.signer_address
    }
}
