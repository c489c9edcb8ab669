//! Harvest strategies
//!
//! A strategy finds surplus candidates and extracts them. The orchestrator
//! drives any `HarvestStrategy`; `AmmSkimStrategy` skims Uniswap V2 pairs.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

pub mod amm_skim;
pub mod discovery;
pub mod executor;
pub mod validator;

pub use amm_skim::AmmSkimStrategy;
pub use discovery::SkimDiscovery;
pub use executor::SkimExecutor;

use crate::types::Candidate;
use async_trait::async_trait;

/// Strategy trait - discovery and execution for one kind of surplus
///
/// Neither method propagates errors: failures are logged and recorded in
/// the metrics error ring, and the pass moves on.
#[async_trait]
pub trait HarvestStrategy: Send + Sync {
    /// Get the name of this strategy for logging
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        "No description available"
    }

    /// Inspect up to the configured number of pools, in enumeration order
    async fn discover_candidates(&mut self) -> Vec<Candidate>;

    /// Build and submit the extraction. `true` only when a transaction
    /// (real or simulated) was accepted.
    async fn execute_candidate(&self, candidate: &Candidate) -> bool;

    fn validate_candidate(&self, candidate: &Candidate) -> bool {
        validator::validate(candidate)
    }
}
