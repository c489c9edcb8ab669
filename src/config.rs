//! Configuration management
//!
//! Settings come from environment variables (optionally seeded from a .env file)
//! or from a TOML file. `validate()` must pass before the first pass starts.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::error::{HarvestError, HarvestResult};
use alloy::primitives::{address, Address};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// PancakeSwap V2 factory on BSC
pub const DEFAULT_FACTORY: Address = address!("cA143Ce32Fe78f1f7019d7d551a6402fC5350c73");
/// PancakeSwap V2 router on BSC
pub const DEFAULT_ROUTER: Address = address!("10ED43C718714eb63d5aA57B78B54704E256024E");
/// WBNB on BSC
pub const DEFAULT_WRAPPED_NATIVE: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");

/// Harvester configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    // Mode
    pub dry_run: bool,

    // Network
    pub chain_id: u64,
    pub rpc_url: String,

    // Wallet (required in live mode only)
    pub private_key: Option<String>,

    // Discovery
    pub max_pairs: usize,
    pub factory: Address,
    pub router: Address,
    /// Only the wrapped-native side of a pair is valued, so surplus is in native units
    pub wrapped_native: Address,
    pub inspection_delay_ms: u64,

    // Profitability
    pub min_profit_eth: Decimal,
    pub gas_limit: u64,
    /// Fallback when the gas price read fails
    pub gas_price_gwei: u64,
    pub gas_multiplier: Decimal,

    // Storage
    pub candidates_file: PathBuf,
    pub metrics_file: PathBuf,

    // Loop
    pub pass_interval_secs: u64,
    pub log_level: String,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            chain_id: 56,
            rpc_url: "https://bsc-dataseed1.binance.org/".to_string(),
            private_key: None,
            max_pairs: 100,
            factory: DEFAULT_FACTORY,
            router: DEFAULT_ROUTER,
            wrapped_native: DEFAULT_WRAPPED_NATIVE,
            inspection_delay_ms: 100,
            min_profit_eth: dec!(0.001),
            gas_limit: 300_000,
            gas_price_gwei: 3,
            gas_multiplier: dec!(1.2),
            candidates_file: PathBuf::from("candidates.txt"),
            metrics_file: PathBuf::from("metrics.json"),
            pass_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl HarvesterConfig {
    /// Build from an arbitrary variable lookup; unset variables keep their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            dry_run: match lookup("DRY_RUN") {
                Some(v) => parse_bool(&v).with_context(|| format!("Invalid DRY_RUN: {}", v))?,
                None => defaults.dry_run,
            },
            chain_id: var_or(&lookup, "CHAIN_ID", defaults.chain_id)?,
            rpc_url: lookup("RPC_URL").unwrap_or(defaults.rpc_url),
            private_key: lookup("PRIVATE_KEY").filter(|k| !k.trim().is_empty()),
            max_pairs: var_or(&lookup, "MAX_PAIRS", defaults.max_pairs)?,
            factory: var_or(&lookup, "UNISWAP_V2_FACTORY", defaults.factory)?,
            router: var_or(&lookup, "UNISWAP_V2_ROUTER", defaults.router)?,
            wrapped_native: var_or(&lookup, "WRAPPED_NATIVE", defaults.wrapped_native)?,
            inspection_delay_ms: var_or(&lookup, "INSPECTION_DELAY_MS", defaults.inspection_delay_ms)?,
            min_profit_eth: var_or(&lookup, "MIN_PROFIT_ETH", defaults.min_profit_eth)?,
            gas_limit: var_or(&lookup, "GAS_LIMIT", defaults.gas_limit)?,
            gas_price_gwei: var_or(&lookup, "GAS_PRICE_GWEI", defaults.gas_price_gwei)?,
            gas_multiplier: var_or(&lookup, "GAS_MULTIPLIER", defaults.gas_multiplier)?,
            candidates_file: lookup("CANDIDATES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.candidates_file),
            metrics_file: lookup("METRICS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.metrics_file),
            pass_interval_secs: var_or(&lookup, "PASS_INTERVAL_SECS", defaults.pass_interval_secs)?,
            log_level: lookup("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Startup checks. A failure here means no pass may run.
    pub fn validate(&self) -> HarvestResult<()> {
        if !self.dry_run && self.private_key.is_none() {
            return Err(HarvestError::Configuration(
                "PRIVATE_KEY is required for LIVE mode".to_string(),
            ));
        }
        if self.min_profit_eth <= Decimal::ZERO {
            return Err(HarvestError::Configuration(format!(
                "MIN_PROFIT_ETH must be greater than 0 (got {})",
                self.min_profit_eth
            )));
        }
        if self.gas_multiplier <= Decimal::ONE {
            return Err(HarvestError::Configuration(format!(
                "GAS_MULTIPLIER must be greater than 1.0 (got {})",
                self.gas_multiplier
            )));
        }
        if self.max_pairs == 0 {
            return Err(HarvestError::Configuration("MAX_PAIRS must be at least 1".to_string()));
        }
        if self.gas_limit == 0 {
            return Err(HarvestError::Configuration("GAS_LIMIT must be at least 1".to_string()));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(HarvestError::Configuration("RPC_URL is empty".to_string()));
        }
        if self.factory == Address::ZERO || self.wrapped_native == Address::ZERO {
            return Err(HarvestError::Configuration(
                "factory and wrapped native addresses must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Fallback gas price in wei
    pub fn default_gas_price_wei(&self) -> u128 {
        self.gas_price_gwei as u128 * crate::gas::WEI_PER_GWEI
    }

    pub fn inspection_delay(&self) -> Duration {
        Duration::from_millis(self.inspection_delay_ms)
    }

    pub fn pass_interval(&self) -> Duration {
        Duration::from_secs(self.pass_interval_secs)
    }
}

/// Load configuration from the process environment (and .env if present)
pub fn load_config() -> Result<HarvesterConfig> {
    dotenv::dotenv().ok();
    HarvesterConfig::from_vars(|key| std::env::var(key).ok())
}

/// Load configuration from a specific env file, then the process environment
pub fn load_config_from_file(env_file: &str) -> Result<HarvesterConfig> {
    dotenv::from_filename(env_file)
        .with_context(|| format!("Failed to load env file: {}", env_file))?;
    HarvesterConfig::from_vars(|key| std::env::var(key).ok())
}

fn var_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}='{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("expected true/false, got '{}'", other),
    }
}
