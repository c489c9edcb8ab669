//! Skim candidate discovery
//!
//! Walks the factory's `allPairs` list and compares each pair's actual
//! wrapped-native balance against its synced reserve. A positive difference
//! is a candidate. Pairs without a wrapped-native side are checked but never
//! produce candidates, so every surplus is denominated in native units.
//!
//! The walk resumes where the previous pass stopped. Once the end of the
//! list is reached the next pass starts over with an empty session.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::chain::ChainClient;
use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair, IERC20};
use crate::error::{HarvestError, HarvestResult};
use crate::gas::wei_to_eth;
use crate::metrics::SharedMetrics;
use crate::types::{Candidate, ErrorKind};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pools seen since the current sweep began, plus where to resume
#[derive(Debug, Default)]
struct SessionState {
    checked: HashSet<Address>,
    cursor: u64,
}

impl SessionState {
    fn reset(&mut self) {
        self.checked.clear();
        self.cursor = 0;
    }
}

pub struct SkimDiscovery<C> {
    chain: Arc<C>,
    metrics: SharedMetrics,
    factory: Address,
    wrapped_native: Address,
    max_pairs: usize,
    inspection_delay: Duration,
    session: SessionState,
}

impl<C: ChainClient> SkimDiscovery<C> {
    pub fn new(
        chain: Arc<C>,
        metrics: SharedMetrics,
        factory: Address,
        wrapped_native: Address,
        max_pairs: usize,
        inspection_delay: Duration,
    ) -> Self {
        Self {
            chain,
            metrics,
            factory,
            wrapped_native,
            max_pairs,
            inspection_delay,
            session: SessionState::default(),
        }
    }

    /// Pools inspected since the current sweep began
    pub fn session_checked(&self) -> usize {
        self.session.checked.len()
    }

    pub async fn discover_candidates(&mut self) -> Vec<Candidate> {
        info!("Starting candidate discovery, max pairs: {}", self.max_pairs);

        let total = match self.pair_count().await {
            Ok(total) => total,
            Err(e) => {
                self.record_discovery_error(&e).await;
                return Vec::new();
            }
        };

        if self.session.cursor > 0 && self.session.cursor >= total {
            info!("Swept all {} pairs, starting over", total);
            self.session.reset();
        }

        let mut candidates = Vec::new();
        let mut inspected = 0usize;

        while inspected < self.max_pairs && self.session.cursor < total {
            let pool = match self.pair_at(self.session.cursor).await {
                Ok(pool) => pool,
                Err(e) => {
                    self.record_discovery_error(&e).await;
                    break;
                }
            };
            self.session.cursor += 1;

            if !self.session.checked.insert(pool) {
                debug!("Already checked {} this session", pool);
                continue;
            }

            if inspected > 0 && !self.inspection_delay.is_zero() {
                tokio::time::sleep(self.inspection_delay).await;
            }
            inspected += 1;

            match self.check_pair_for_surplus(pool).await {
                Ok(Some(candidate)) => {
                    info!(
                        "Found candidate in pair {}: surplus {}",
                        pool, candidate.surplus_amount
                    );
                    candidates.push(candidate);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Error checking pair {}: {}", pool, e);
                    self.metrics
                        .write()
                        .await
                        .record_error(format!("Error checking pair {}: {}", pool, e), ErrorKind::PairCheck);
                }
            }

            self.metrics
                .write()
                .await
                .record_pair_checked(&pool.to_string());
        }

        self.metrics
            .write()
            .await
            .record_candidates_found(candidates.len());
        info!(
            "Discovery complete. Inspected {} pairs, found {} candidates",
            inspected,
            candidates.len()
        );

        candidates
    }

    /// Compare the wrapped-native balance of `pool` against its reserve
    pub async fn check_pair_for_surplus(&self, pool: Address) -> HarvestResult<Option<Candidate>> {
        let token0 = self.call_contract(pool, IUniswapV2Pair::token0Call {}).await?;
        let token1 = self.call_contract(pool, IUniswapV2Pair::token1Call {}).await?;
        let (reserve0, reserve1) = self.pair_reserves(pool).await?;

        let (token, reserve) = if token0 == self.wrapped_native {
            (token0, reserve0)
        } else if token1 == self.wrapped_native {
            (token1, reserve1)
        } else {
            debug!("Pair {} has no wrapped native side, skipping", pool);
            return Ok(None);
        };

        let balance = self
            .call_contract(token, IERC20::balanceOfCall { account: pool })
            .await?;

        // Fee-on-transfer tokens can leave balance below reserve
        let surplus = balance.saturating_sub(reserve);
        if surplus.is_zero() {
            return Ok(None);
        }

        let surplus_wei = u128::try_from(surplus).map_err(|_| {
            HarvestError::Validation(format!("surplus {} in {} out of range", surplus, pool))
        })?;

        Ok(Some(Candidate::new(pool, token, wei_to_eth(surplus_wei))))
    }

    /// Synced reserves of a pair
    pub async fn pair_reserves(&self, pool: Address) -> HarvestResult<(U256, U256)> {
        let reserves = self
            .call_contract(pool, IUniswapV2Pair::getReservesCall {})
            .await?;
        Ok((U256::from(reserves.reserve0), U256::from(reserves.reserve1)))
    }

    async fn pair_count(&self) -> HarvestResult<u64> {
        let length = self
            .call_contract(self.factory, IUniswapV2Factory::allPairsLengthCall {})
            .await
            .map_err(|e| HarvestError::Discovery(format!("allPairsLength: {}", e)))?;
        Ok(length.saturating_to::<u64>())
    }

    async fn pair_at(&self, index: u64) -> HarvestResult<Address> {
        self.call_contract(self.factory, IUniswapV2Factory::allPairsCall { index: U256::from(index) })
            .await
            .map_err(|e| HarvestError::Discovery(format!("allPairs({}): {}", index, e)))
    }

    async fn call_contract<T>(&self, to: Address, call: T) -> HarvestResult<T::Return>
    where
        T: SolCall + Send + Sync,
    {
        let data = Bytes::from(call.abi_encode());
        let raw = self.chain.call(to, data).await?;
        T::abi_decode_returns(&raw).map_err(HarvestError::provider)
    }

    async fn record_discovery_error(&self, e: &HarvestError) {
        warn!("Error in candidate discovery: {}", e);
        self.metrics
            .write()
            .await
            .record_error(format!("Discovery error: {}", e), ErrorKind::Discovery);
    }
}
