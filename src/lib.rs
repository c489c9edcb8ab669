//! AMM Dust Harvester Library
//!
//! Finds Uniswap V2 style pairs holding more wrapped-native balance than
//! their synced reserves, checks that skimming the surplus pays for gas,
//! and submits `skim` transactions (or simulates them in dry run mode).
//!
//! Author: AI-Generated
//! Created: 2026-10-14

pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod gas;
pub mod metrics;
pub mod orchestrator;
pub mod snapshot;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use chain::{ChainClient, RpcChain};
pub use config::{load_config, HarvesterConfig};
pub use error::{HarvestError, HarvestResult};
pub use gas::{GasEvaluator, ProfitEstimate};
pub use metrics::{MetricsCollector, SharedMetrics};
pub use orchestrator::{Harvester, HarvesterStatus, StatusReport};
pub use snapshot::CandidateSnapshot;
pub use strategy::{AmmSkimStrategy, HarvestStrategy};
pub use types::{Candidate, ErrorKind};
