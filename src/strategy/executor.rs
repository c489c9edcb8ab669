//! Skim Execution
//!
//! Builds `skim(recipient)` transactions for validated candidates and hands
//! them to the chain client. In dry run mode nothing reaches the chain: the
//! request is still built (so gas pricing and calldata are exercised) and the
//! all-zero hash is reported back.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::chain::ChainClient;
use crate::contracts::IUniswapV2Pair;
use crate::error::{HarvestError, HarvestResult};
use crate::gas::{gas_cost_eth, GasEvaluator};
use crate::metrics::SharedMetrics;
use crate::strategy::validator;
use crate::types::{Candidate, ErrorKind, SubmittedTx, TxRequest};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Calldata for `skim(recipient)`
pub fn encode_skim(recipient: Address) -> Bytes {
    Bytes::from(IUniswapV2Pair::skimCall { to: recipient }.abi_encode())
}

pub struct SkimExecutor<C> {
    chain: Arc<C>,
    evaluator: Arc<GasEvaluator<C>>,
    metrics: SharedMetrics,
    chain_id: u64,
    dry_run: bool,
}

impl<C: ChainClient> SkimExecutor<C> {
    pub fn new(
        chain: Arc<C>,
        evaluator: Arc<GasEvaluator<C>>,
        metrics: SharedMetrics,
        chain_id: u64,
        dry_run: bool,
    ) -> Self {
        Self {
            chain,
            evaluator,
            metrics,
            chain_id,
            dry_run,
        }
    }

    /// Submit one skim. Never retries; failures are recorded as `execution` errors.
    pub async fn execute_candidate(&self, candidate: &Candidate) -> bool {
        if !validator::validate(candidate) {
            warn!("Invalid candidate: {}", candidate);
            return false;
        }

        let started = Instant::now();
        let outcome = self.submit(candidate).await;
        self.metrics
            .write()
            .await
            .record_execution_time(started.elapsed());

        match outcome {
            Ok((tx, request)) => {
                if tx.dry_run {
                    info!("DRY RUN: skim of {} simulated", candidate.pool_address);
                } else {
                    info!("Skim transaction sent: {}", tx.hash);
                }

                let gas_cost = gas_cost_eth(request.gas_price, request.gas_limit, Decimal::ONE);
                self.metrics
                    .write()
                    .await
                    .record_candidate_executed(candidate.surplus_amount, gas_cost);
                true
            }
            Err(e) => {
                error!("Error executing candidate {}: {}", candidate, e);
                self.metrics.write().await.record_error(
                    format!("Execution error for {}: {}", candidate.pool_address, e),
                    ErrorKind::Execution,
                );
                false
            }
        }
    }

    /// Skim request for `pool`, priced with the optimized gas price
    pub async fn build_transaction(&self, pool: Address) -> HarvestResult<TxRequest> {
        let from = match self.chain.sender() {
            Some(sender) => sender,
            None if self.dry_run => Address::ZERO,
            None => {
                return Err(HarvestError::Configuration(
                    "No private key configured for live transactions".to_string(),
                ))
            }
        };

        let gas_price = self.evaluator.optimize_gas_price().await;

        Ok(TxRequest {
            from,
            to: pool,
            value: U256::ZERO,
            gas_limit: self.evaluator.gas_limit(),
            gas_price,
            data: encode_skim(from),
            chain_id: self.chain_id,
            nonce: None,
        })
    }

    async fn submit(&self, candidate: &Candidate) -> HarvestResult<(SubmittedTx, TxRequest)> {
        let pool = Address::from_str(&candidate.pool_address)
            .map_err(|e| HarvestError::Validation(format!("pool address: {}", e)))?;

        let request = self.build_transaction(pool).await?;

        if self.dry_run {
            info!(
                "DRY RUN: Would send skim to {} (gas {} @ {} wei)",
                request.to, request.gas_limit, request.gas_price
            );
            return Ok((SubmittedTx::dry_run(), request));
        }

        let tx = self
            .chain
            .send_transaction(request.clone())
            .await
            .map_err(|e| HarvestError::Execution(e.to_string()))?;
        Ok((tx, request))
    }
}
