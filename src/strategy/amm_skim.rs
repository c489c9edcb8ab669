//! AMM skim strategy - surplus sitting in Uniswap V2 style pairs

use super::{HarvestStrategy, SkimDiscovery, SkimExecutor};
use crate::chain::ChainClient;
use crate::config::HarvesterConfig;
use crate::gas::GasEvaluator;
use crate::metrics::SharedMetrics;
use crate::types::Candidate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct AmmSkimStrategy<C> {
    discovery: SkimDiscovery<C>,
    executor: SkimExecutor<C>,
}

impl<C: ChainClient> AmmSkimStrategy<C> {
    pub fn new(discovery: SkimDiscovery<C>, executor: SkimExecutor<C>) -> Self {
        info!("Initialized strategy: AmmSkim");
        Self { discovery, executor }
    }

    pub fn from_config(
        chain: Arc<C>,
        evaluator: Arc<GasEvaluator<C>>,
        metrics: SharedMetrics,
        config: &HarvesterConfig,
    ) -> Self {
        let discovery = SkimDiscovery::new(
            Arc::clone(&chain),
            Arc::clone(&metrics),
            config.factory,
            config.wrapped_native,
            config.max_pairs,
            config.inspection_delay(),
        );
        let executor = SkimExecutor::new(chain, evaluator, metrics, config.chain_id, config.dry_run);
        Self::new(discovery, executor)
    }
}

#[async_trait]
impl<C: ChainClient> HarvestStrategy for AmmSkimStrategy<C> {
    fn name(&self) -> &str {
        "AmmSkim"
    }

    fn description(&self) -> &str {
        "Skims wrapped-native surplus out of Uniswap V2 style pairs"
    }

    async fn discover_candidates(&mut self) -> Vec<Candidate> {
        self.discovery.discover_candidates().await
    }

    async fn execute_candidate(&self, candidate: &Candidate) -> bool {
        self.executor.execute_candidate(candidate).await
    }
}
