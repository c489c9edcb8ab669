//! Gas & Profitability Evaluation
//!
//! Decides whether a candidate's surplus pays for the skim transaction.
//! All amounts are compared in native units (ETH/BNB) as `Decimal`:
//!
//!   gas_cost = gas_price * gas_limit * gas_multiplier
//!   profit   = surplus - gas_cost
//!   verdict  = profit > min_profit
//!
//! A failed gas price read falls back to the configured default price.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::chain::ChainClient;
use crate::config::HarvesterConfig;
use crate::types::Candidate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Native token decimals (wei → ETH)
const NATIVE_DECIMALS: u32 = 18;

/// Convert a wei amount to native units. Saturates at `Decimal::MAX`.
pub fn wei_to_eth(wei: u128) -> Decimal {
    i128::try_from(wei)
        .ok()
        .and_then(|w| Decimal::try_from_i128_with_scale(w, NATIVE_DECIMALS).ok())
        .map(|d| d.normalize())
        .unwrap_or(Decimal::MAX)
}

/// Gas cost in native units for `gas_price` wei per gas unit
pub fn gas_cost_eth(gas_price: u128, gas_limit: u64, gas_multiplier: Decimal) -> Decimal {
    wei_to_eth(gas_price)
        .checked_mul(Decimal::from(gas_limit))
        .and_then(|c| c.checked_mul(gas_multiplier))
        .unwrap_or(Decimal::MAX)
}

/// Outcome of the profitability formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfitEstimate {
    pub gas_cost: Decimal,
    pub profit: Decimal,
    pub profitable: bool,
}

impl ProfitEstimate {
    /// Pure verdict over the five inputs; no I/O, no randomness.
    pub fn compute(
        surplus: Decimal,
        gas_price: u128,
        gas_limit: u64,
        gas_multiplier: Decimal,
        min_profit: Decimal,
    ) -> Self {
        let gas_cost = gas_cost_eth(gas_price, gas_limit, gas_multiplier);
        let profit = surplus.checked_sub(gas_cost).unwrap_or(Decimal::MIN);
        Self {
            gas_cost,
            profit,
            profitable: profit > min_profit,
        }
    }
}

/// Reads gas conditions and renders profitability verdicts
pub struct GasEvaluator<C> {
    chain: Arc<C>,
    gas_limit: u64,
    gas_multiplier: Decimal,
    default_gas_price: u128,
    min_profit: Decimal,
}

impl<C: ChainClient> GasEvaluator<C> {
    pub fn new(
        chain: Arc<C>,
        gas_limit: u64,
        gas_multiplier: Decimal,
        default_gas_price: u128,
        min_profit: Decimal,
    ) -> Self {
        Self {
            chain,
            gas_limit,
            gas_multiplier,
            default_gas_price,
            min_profit,
        }
    }

    pub fn from_config(chain: Arc<C>, config: &HarvesterConfig) -> Self {
        Self::new(
            chain,
            config.gas_limit,
            config.gas_multiplier,
            config.default_gas_price_wei(),
            config.min_profit_eth,
        )
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Current gas price in wei, or the configured default if the read fails
    pub async fn current_gas_price(&self) -> u128 {
        match self.chain.get_gas_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!(
                    "Error getting gas price: {}, using default {} wei",
                    e, self.default_gas_price
                );
                self.default_gas_price
            }
        }
    }

    /// Estimated cost of one skim at `gas_price` wei
    pub fn estimate_gas_cost(&self, gas_price: u128) -> Decimal {
        gas_cost_eth(gas_price, self.gas_limit, self.gas_multiplier)
    }

    pub async fn evaluate(&self, candidate: &Candidate) -> ProfitEstimate {
        let gas_price = self.current_gas_price().await;
        ProfitEstimate::compute(
            candidate.surplus_amount,
            gas_price,
            self.gas_limit,
            self.gas_multiplier,
            self.min_profit,
        )
    }

    pub async fn is_profitable(&self, candidate: &Candidate) -> bool {
        let estimate = self.evaluate(candidate).await;

        if estimate.profitable {
            info!(
                "Profitable candidate: {}, profit: {} ETH",
                candidate.pool_address, estimate.profit
            );
        } else {
            debug!(
                "Not profitable: {}, profit: {} ETH, gas: {} ETH",
                candidate.pool_address, estimate.profit, estimate.gas_cost
            );
        }

        estimate.profitable
    }

    /// Current price inflated by the safety multiplier, for faster inclusion
    pub async fn optimize_gas_price(&self) -> u128 {
        let current = self.current_gas_price().await;
        Decimal::from_u128(current)
            .and_then(|price| price.checked_mul(self.gas_multiplier))
            .and_then(|price| price.trunc().to_u128())
            .unwrap_or(current)
    }
}
