//! Harvest Orchestrator
//!
//! One pass = discover everything, persist the snapshot, then evaluate and
//! execute candidates in discovery order. `run_until_stopped` repeats passes
//! until the status handle is stopped; the flag is only consulted between
//! passes, so an in-flight pass always runs to completion.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::chain::ChainClient;
use crate::config::HarvesterConfig;
use crate::error::HarvestResult;
use crate::gas::GasEvaluator;
use crate::metrics::SharedMetrics;
use crate::snapshot::CandidateSnapshot;
use crate::strategy::{AmmSkimStrategy, HarvestStrategy};
use crate::types::{Candidate, ErrorKind};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Lock-free view of the pipeline for status readers.
///
/// Written only by the pipeline; readers may observe a pass half-applied.
#[derive(Debug)]
pub struct HarvesterStatus {
    running: AtomicBool,
    /// Unix seconds, 0 before the first pass
    last_run_ts: AtomicI64,
    candidate_count: AtomicU64,
    executed_count: AtomicU64,
    dry_run: bool,
    /// Set by `stop`, consumed by the next `start` or loop exit
    stop_requested: AtomicBool,
    stop_signal: Notify,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub last_run_timestamp: Option<DateTime<Utc>>,
    /// Candidates discovered by the latest pass
    pub candidate_count: u64,
    /// Successful executions since start
    pub executed_count: u64,
    pub dry_run: bool,
}

impl HarvesterStatus {
    pub fn new(dry_run: bool) -> Self {
        Self {
            running: AtomicBool::new(false),
            last_run_ts: AtomicI64::new(0),
            candidate_count: AtomicU64::new(0),
            executed_count: AtomicU64::new(0),
            dry_run,
            stop_requested: AtomicBool::new(false),
            stop_signal: Notify::new(),
        }
    }

    /// Mark the pipeline running. Returns false, and stays stopped, when a
    /// stop arrived before the loop got going.
    pub fn start(&self) -> bool {
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.running.store(true, Ordering::SeqCst);
        true
    }

    /// Clear the running flag and wake a loop sleeping between passes.
    /// Leaves no permit behind, so later waits are not cut short.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.stop_signal.notify_waiters();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn record_pass(&self, candidates: usize, executed: usize) {
        self.last_run_ts.store(Utc::now().timestamp(), Ordering::SeqCst);
        self.candidate_count.store(candidates as u64, Ordering::SeqCst);
        self.executed_count.fetch_add(executed as u64, Ordering::SeqCst);
    }

    pub fn report(&self) -> StatusReport {
        let ts = self.last_run_ts.load(Ordering::SeqCst);
        StatusReport {
            running: self.is_running(),
            last_run_timestamp: if ts > 0 {
                Utc.timestamp_opt(ts, 0).single()
            } else {
                None
            },
            candidate_count: self.candidate_count.load(Ordering::SeqCst),
            executed_count: self.executed_count.load(Ordering::SeqCst),
            dry_run: self.dry_run,
        }
    }
}

pub struct Harvester<S, C> {
    strategy: S,
    evaluator: Arc<GasEvaluator<C>>,
    snapshot: CandidateSnapshot,
    metrics: SharedMetrics,
    status: Arc<HarvesterStatus>,
}

impl<C: ChainClient> Harvester<AmmSkimStrategy<C>, C> {
    /// Skim harvester wired from configuration
    pub fn amm_skim(chain: Arc<C>, config: &HarvesterConfig, metrics: SharedMetrics) -> Self {
        let evaluator = Arc::new(GasEvaluator::from_config(Arc::clone(&chain), config));
        let strategy = AmmSkimStrategy::from_config(
            chain,
            Arc::clone(&evaluator),
            Arc::clone(&metrics),
            config,
        );
        Self::new(
            strategy,
            evaluator,
            CandidateSnapshot::new(&config.candidates_file),
            metrics,
            Arc::new(HarvesterStatus::new(config.dry_run)),
        )
    }
}

impl<S: HarvestStrategy, C: ChainClient> Harvester<S, C> {
    pub fn new(
        strategy: S,
        evaluator: Arc<GasEvaluator<C>>,
        snapshot: CandidateSnapshot,
        metrics: SharedMetrics,
        status: Arc<HarvesterStatus>,
    ) -> Self {
        Self {
            strategy,
            evaluator,
            snapshot,
            metrics,
            status,
        }
    }

    pub fn status(&self) -> Arc<HarvesterStatus> {
        Arc::clone(&self.status)
    }

    pub fn metrics(&self) -> SharedMetrics {
        Arc::clone(&self.metrics)
    }

    /// Candidates from the latest snapshot
    pub fn list_candidates(&self) -> HarvestResult<Vec<Candidate>> {
        self.snapshot.read()
    }

    /// Run a single discovery-then-execution pass. Returns the executed count.
    pub async fn run_pass(&mut self) -> usize {
        let started = Instant::now();
        self.metrics.write().await.start_session();
        info!(
            "Starting pass with strategy {} ({})",
            self.strategy.name(),
            self.strategy.description()
        );

        let candidates = self.strategy.discover_candidates().await;

        if let Err(e) = self.snapshot.write(&candidates) {
            error!("Error saving candidates: {}", e);
            self.metrics
                .write()
                .await
                .record_error(format!("Error saving candidates: {}", e), ErrorKind::Snapshot);
        }

        let mut executed = 0usize;
        for candidate in &candidates {
            if !self.strategy.validate_candidate(candidate) {
                warn!("Invalid candidate: {}", candidate);
                continue;
            }
            if !self.evaluator.is_profitable(candidate).await {
                debug!("Skipping unprofitable candidate {}", candidate.pool_address);
                continue;
            }
            if self.strategy.execute_candidate(candidate).await {
                executed += 1;
            }
        }

        self.metrics
            .write()
            .await
            .finish_run(executed, started.elapsed());
        self.status.record_pass(candidates.len(), executed);

        info!(
            "Pass complete: {} candidates, {} executed in {:?}",
            candidates.len(),
            executed,
            started.elapsed()
        );
        executed
    }

    /// Repeat passes every `interval` until the status handle is stopped
    pub async fn run_until_stopped(&mut self, interval: Duration) {
        if !self.status.start() {
            info!("Stop requested before start, no passes run");
            return;
        }
        info!("Harvester started (dry run: {})", self.status.is_dry_run());

        while self.status.is_running() {
            self.run_pass().await;

            // Registered before the flag check so a stop landing in between still wakes us
            let notified = self.status.stop_signal.notified();
            if !self.status.is_running() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = notified => {
                    warn!("Stop requested, leaving pass loop");
                }
            }
        }

        self.status.stop_requested.store(false, Ordering::SeqCst);
        info!("Harvester stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{MockChain, MockPair, FACTORY, WRAPPED_NATIVE};
    use crate::metrics::MetricsCollector;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    const TEN_MILLI_ETH: u128 = 10_000_000_000_000_000;
    /// Below the 0.0018 ETH gas cost at 5 gwei
    const DUST: u128 = 1_000_000_000_000_000;

    fn config(dir: &TempDir, dry_run: bool) -> HarvesterConfig {
        HarvesterConfig {
            dry_run,
            factory: FACTORY,
            wrapped_native: WRAPPED_NATIVE,
            inspection_delay_ms: 0,
            candidates_file: dir.path().join("candidates.txt"),
            metrics_file: dir.path().join("metrics.json"),
            private_key: Some("unused".to_string()),
            ..HarvesterConfig::default()
        }
    }

    fn harvester(
        chain: MockChain,
        config: &HarvesterConfig,
    ) -> (Harvester<AmmSkimStrategy<MockChain>, MockChain>, Arc<MockChain>) {
        let chain = Arc::new(chain);
        let metrics = MetricsCollector::new().shared();
        (Harvester::amm_skim(Arc::clone(&chain), config, metrics), chain)
    }

    #[tokio::test]
    async fn test_pass_executes_only_profitable_candidates() {
        let dir = TempDir::new().unwrap();
        let pools = vec![
            MockPair::with_native_surplus(1, TEN_MILLI_ETH),
            MockPair::with_native_surplus(2, DUST),
            MockPair::balanced(3),
            MockPair::with_native_surplus(4, TEN_MILLI_ETH),
        ];
        let (mut harvester, chain) = harvester(MockChain::new(pools), &config(&dir, false));

        let executed = harvester.run_pass().await;

        assert_eq!(executed, 2);
        assert_eq!(chain.sent_count(), 2);

        let listed = harvester.list_candidates().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].surplus_amount, dec!(0.001));

        let report = harvester.status().report();
        assert_eq!(report.candidate_count, 3);
        assert_eq!(report.executed_count, 2);
        assert!(report.last_run_timestamp.is_some());

        let metrics = harvester.metrics();
        let metrics = metrics.read().await;
        assert_eq!(metrics.last_run_stats().candidates_executed, 2);
        assert_eq!(metrics.last_run_stats().pairs_checked, 4);
        assert!(metrics.errors().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_pass_never_sends() {
        let dir = TempDir::new().unwrap();
        let pools = vec![MockPair::with_native_surplus(1, TEN_MILLI_ETH)];
        let (mut harvester, chain) = harvester(MockChain::new(pools), &config(&dir, true));

        assert_eq!(harvester.run_pass().await, 1);
        assert_eq!(chain.sent_count(), 0);
        assert!(harvester.status().report().dry_run);
    }

    #[tokio::test]
    async fn test_failed_execution_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let mut chain = MockChain::new(vec![MockPair::with_native_surplus(1, TEN_MILLI_ETH)]);
        chain.fail_send = true;
        let (mut harvester, _chain) = harvester(chain, &config(&dir, false));

        assert_eq!(harvester.run_pass().await, 0);
        assert_eq!(harvester.status().report().executed_count, 0);
    }

    #[tokio::test]
    async fn test_empty_pass_empties_snapshot() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, true);
        std::fs::write(&cfg.candidates_file, "stale row\n").unwrap();
        let (mut harvester, _chain) = harvester(MockChain::new(vec![MockPair::balanced(1)]), &cfg);

        assert_eq!(harvester.run_pass().await, 0);
        assert_eq!(std::fs::read_to_string(&cfg.candidates_file).unwrap(), "");
    }

    #[tokio::test]
    async fn test_snapshot_failure_does_not_abort_pass() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, true);
        cfg.candidates_file = dir.path().join("missing").join("candidates.txt");
        let pools = vec![MockPair::with_native_surplus(1, TEN_MILLI_ETH)];
        let (mut harvester, _chain) = harvester(MockChain::new(pools), &cfg);

        assert_eq!(harvester.run_pass().await, 1);
        let metrics = harvester.metrics();
        assert_eq!(
            metrics.read().await.errors().latest().unwrap().kind,
            ErrorKind::Snapshot
        );
    }

    #[tokio::test]
    async fn test_stop_interrupts_wait_between_passes() {
        let dir = TempDir::new().unwrap();
        let (mut harvester, _chain) = harvester(MockChain::new(vec![]), &config(&dir, true));
        let status = harvester.status();

        let stopper = tokio::spawn({
            let status = Arc::clone(&status);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                status.stop();
            }
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            harvester.run_until_stopped(Duration::from_secs(3600)),
        )
        .await
        .expect("loop should exit once stopped");
        stopper.await.unwrap();

        let report = status.report();
        assert!(!report.running);
        assert!(report.last_run_timestamp.is_some());
    }

    #[tokio::test]
    async fn test_stop_before_start_runs_no_pass() {
        let dir = TempDir::new().unwrap();
        let pools = vec![MockPair::with_native_surplus(1, TEN_MILLI_ETH)];
        let (mut harvester, chain) = harvester(MockChain::new(pools), &config(&dir, false));
        let status = harvester.status();

        status.stop();
        tokio::time::timeout(
            Duration::from_millis(500),
            harvester.run_until_stopped(Duration::from_secs(3600)),
        )
        .await
        .expect("a pending stop should win over start");

        let report = status.report();
        assert!(!report.running);
        assert!(report.last_run_timestamp.is_none());
        assert_eq!(chain.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_leaves_no_permit_for_a_later_wait() {
        let dir = TempDir::new().unwrap();
        let pools = vec![MockPair::with_native_surplus(1, TEN_MILLI_ETH)];
        let (mut harvester, _chain) = harvester(MockChain::new(pools), &config(&dir, true));
        let status = harvester.status();

        // Nobody is waiting yet; a stored permit would end the next sleep early
        status.stop();
        let started = Instant::now();
        harvester.run_until_stopped(Duration::from_secs(3600)).await;
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(status.report().executed_count, 0);

        // The pending stop was consumed, so a fresh loop sleeps the full interval
        let interval = Duration::from_millis(150);
        let stopper = tokio::spawn({
            let status = Arc::clone(&status);
            async move {
                tokio::time::sleep(Duration::from_millis(400)).await;
                status.stop();
            }
        });
        let started = Instant::now();
        tokio::time::timeout(Duration::from_secs(5), harvester.run_until_stopped(interval))
            .await
            .expect("loop should exit once stopped");
        stopper.await.unwrap();

        // One dry-run skim per pass; a second pass means the first sleep ran to completion
        assert!(started.elapsed() >= interval);
        assert!(status.report().executed_count >= 2);
    }
}
