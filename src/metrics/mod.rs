//! Harvester Metrics
//!
//! Process-wide counters for the pipeline: candidates found and executed,
//! profit and gas accumulators, bounded execution-time and error histories,
//! and the set of pools inspected. The collector is constructed explicitly
//! and persisted only through `save_to_file` / `load_from_file`.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

pub mod ring;

pub use ring::BoundedRing;

use crate::error::HarvestResult;
use crate::types::ErrorKind;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Execution-time samples kept in memory
pub const EXECUTION_TIME_CAPACITY: usize = 100;
/// Error records kept in memory
pub const ERROR_CAPACITY: usize = 50;

/// Collector shared between the pipeline (writer) and status readers
pub type SharedMetrics = Arc<RwLock<MetricsCollector>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub kind: ErrorKind,
}

/// Counters for the most recent pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastRunStats {
    pub candidates_found: usize,
    pub candidates_executed: usize,
    pub pairs_checked: usize,
    pub duration_ms: u64,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsCollector {
    start_time: Option<DateTime<Utc>>,
    total_candidates_found: u64,
    total_candidates_executed: u64,
    total_profit_eth: Decimal,
    total_gas_spent_eth: Decimal,
    /// Seconds per execution attempt
    execution_times: BoundedRing<f64, EXECUTION_TIME_CAPACITY>,
    errors: BoundedRing<ErrorRecord, ERROR_CAPACITY>,
    pairs_checked: BTreeSet<String>,
    last_run_stats: LastRunStats,
}

/// Read-only digest for status surfaces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub runtime_seconds: f64,
    pub total_candidates_found: u64,
    pub total_candidates_executed: u64,
    pub success_rate_percent: f64,
    pub total_profit_eth: Decimal,
    pub total_gas_spent_eth: Decimal,
    pub net_profit_eth: Decimal,
    pub average_execution_time: f64,
    pub unique_pairs_checked: usize,
    pub error_count: usize,
    pub last_run_stats: LastRunStats,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedMetrics {
        Arc::new(RwLock::new(self))
    }

    /// Reset the session clock and the per-pass counters
    pub fn start_session(&mut self) {
        self.start_time = Some(Utc::now());
        self.last_run_stats = LastRunStats::default();
        info!("Metrics session started");
    }

    pub fn record_candidates_found(&mut self, count: usize) {
        self.total_candidates_found += count as u64;
        self.last_run_stats.candidates_found = count;
    }

    pub fn record_candidate_executed(&mut self, profit_eth: Decimal, gas_cost_eth: Decimal) {
        self.total_candidates_executed += 1;
        self.last_run_stats.candidates_executed += 1;
        self.total_profit_eth = self.total_profit_eth.saturating_add(profit_eth);
        self.total_gas_spent_eth = self.total_gas_spent_eth.saturating_add(gas_cost_eth);
    }

    pub fn record_execution_time(&mut self, elapsed: Duration) {
        self.execution_times.push(elapsed.as_secs_f64());
    }

    pub fn record_error(&mut self, message: impl Into<String>, kind: ErrorKind) {
        self.errors.push(ErrorRecord {
            timestamp: Utc::now(),
            message: message.into(),
            kind,
        });
    }

    pub fn record_pair_checked(&mut self, pool_address: &str) {
        self.pairs_checked.insert(pool_address.to_string());
        self.last_run_stats.pairs_checked += 1;
    }

    /// Close out the pass started by the last `start_session`
    pub fn finish_run(&mut self, executed: usize, elapsed: Duration) {
        self.last_run_stats.candidates_executed = executed;
        self.last_run_stats.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.last_run_stats.finished_at = Some(Utc::now());
    }

    pub fn total_candidates_found(&self) -> u64 {
        self.total_candidates_found
    }

    pub fn total_candidates_executed(&self) -> u64 {
        self.total_candidates_executed
    }

    pub fn errors(&self) -> &BoundedRing<ErrorRecord, ERROR_CAPACITY> {
        &self.errors
    }

    pub fn execution_times(&self) -> &BoundedRing<f64, EXECUTION_TIME_CAPACITY> {
        &self.execution_times
    }

    pub fn pairs_checked(&self) -> &BTreeSet<String> {
        &self.pairs_checked
    }

    pub fn last_run_stats(&self) -> &LastRunStats {
        &self.last_run_stats
    }

    pub fn summary(&self) -> MetricsSummary {
        let runtime_seconds = self
            .start_time
            .map(|start| (Utc::now() - start).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        let average_execution_time = if self.execution_times.is_empty() {
            0.0
        } else {
            self.execution_times.iter().sum::<f64>() / self.execution_times.len() as f64
        };

        let success_rate_percent = if self.total_candidates_found > 0 {
            Decimal::from_u64(self.total_candidates_executed)
                .zip(Decimal::from_u64(self.total_candidates_found))
                .and_then(|(executed, found)| executed.checked_div(found))
                .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64())
                .unwrap_or(0.0)
        } else {
            0.0
        };

        MetricsSummary {
            runtime_seconds,
            total_candidates_found: self.total_candidates_found,
            total_candidates_executed: self.total_candidates_executed,
            success_rate_percent,
            total_profit_eth: self.total_profit_eth,
            total_gas_spent_eth: self.total_gas_spent_eth,
            net_profit_eth: self.total_profit_eth.saturating_sub(self.total_gas_spent_eth),
            average_execution_time,
            unique_pairs_checked: self.pairs_checked.len(),
            error_count: self.errors.len(),
            last_run_stats: self.last_run_stats.clone(),
        }
    }

    /// Write a pretty JSON snapshot (temp file, then rename)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> HarvestResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        let temp_path = path.as_ref().with_extension("tmp");
        std::fs::write(&temp_path, &json)?;
        std::fs::rename(&temp_path, path.as_ref())?;

        info!("Metrics saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> HarvestResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let metrics: Self = serde_json::from_str(&json)?;
        info!("Metrics loaded from {}", path.as_ref().display());
        Ok(metrics)
    }

    /// Previous snapshot if one is readable, otherwise a fresh collector
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        if !path.as_ref().exists() {
            return Self::new();
        }
        match Self::load_from_file(path.as_ref()) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(
                    "Ignoring unreadable metrics file {}: {}",
                    path.as_ref().display(),
                    e
                );
                Self::new()
            }
        }
    }
}
