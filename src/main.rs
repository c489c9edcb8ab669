//! AMM Dust Harvester
//!
//! Main entry point. Loads configuration, connects to the chain, and runs
//! discovery/execution passes until SIGINT or SIGTERM. Metrics are saved
//! on the way out.
//!
//! Usage:
//!   dust-harvester                      # loop, config from env / .env
//!   dust-harvester --once --dry-run     # single simulated pass
//!   dust-harvester --config harvester.toml
//!   dust-harvester --list-candidates    # print the latest snapshot
//!   dust-harvester --status             # print saved metrics summary
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use anyhow::{Context, Result};
use clap::Parser;
use dust_harvester::config::{load_config, load_config_from_file};
use dust_harvester::{
    CandidateSnapshot, ChainClient, Harvester, HarvesterConfig, MetricsCollector, RpcChain,
};
use futures::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// AMM Dust Harvester - skim surplus out of V2 pairs
#[derive(Parser)]
#[command(name = "dust-harvester")]
struct Args {
    /// Env file to load before reading the environment
    #[arg(long, env = "ENV_FILE")]
    env_file: Option<String>,

    /// TOML config file (takes precedence over environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Force dry run regardless of configuration
    #[arg(long)]
    dry_run: bool,

    /// Print the latest candidate snapshot and exit
    #[arg(long)]
    list_candidates: bool,

    /// Print the saved metrics summary and exit
    #[arg(long)]
    status: bool,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }
}

fn load(args: &Args) -> Result<HarvesterConfig> {
    let mut config = match (&args.config, &args.env_file) {
        (Some(path), _) => HarvesterConfig::from_toml_file(path)?,
        (None, Some(env_file)) => load_config_from_file(env_file)?,
        (None, None) => load_config()?,
    };
    if args.dry_run {
        config.dry_run = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load(&args)?;
    init_logging(&config.log_level);

    // Read-only commands need no chain connection
    if args.list_candidates {
        let candidates = CandidateSnapshot::new(&config.candidates_file).read()?;
        for candidate in &candidates {
            println!("{}", candidate);
        }
        return Ok(());
    }
    if args.status {
        let metrics = MetricsCollector::load_or_default(&config.metrics_file);
        println!("{}", serde_json::to_string_pretty(&metrics.summary())?);
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("   AMM Dust Harvester");
    info!("   Mode: {}", if config.dry_run { "DRY RUN" } else { "LIVE" });
    info!("===========================================");
    info!("Chain id: {}", config.chain_id);
    info!("Factory: {}", config.factory);
    info!("Router: {}", config.router);
    info!("Max pairs per pass: {}", config.max_pairs);
    info!("Min profit: {} ETH", config.min_profit_eth);

    let chain = Arc::new(
        RpcChain::connect(&config)
            .await
            .context("Failed to connect to RPC")?,
    );
    match chain.get_latest_block().await {
        Ok(block) => info!("Connected! Current block: {}", block),
        Err(e) => warn!("Connected, but block number unavailable: {}", e),
    }

    let metrics = MetricsCollector::load_or_default(&config.metrics_file).shared();
    let mut harvester = Harvester::amm_skim(chain, &config, Arc::clone(&metrics));

    if args.once {
        let executed = harvester.run_pass().await;
        info!("Single pass executed {} candidates", executed);
    } else {
        let status = harvester.status();
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let signal_task = tokio::spawn(async move {
            if let Some(sig) = signals.next().await {
                info!("Received signal {} - stopping after current pass", sig);
                status.stop();
            }
        });

        harvester.run_until_stopped(config.pass_interval()).await;

        handle.close();
        signal_task.abort();
    }

    if let Err(e) = metrics.read().await.save_to_file(&config.metrics_file) {
        error!("Error saving metrics: {}", e);
    }

    Ok(())
}
