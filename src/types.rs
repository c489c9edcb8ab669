//! Core data structures shared by the discovery, evaluation and execution stages.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use alloy::primitives::{Address, Bytes, B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash reported for every simulated (dry run) submission
pub const DRY_RUN_TX_HASH: B256 = B256::ZERO;

/// A pool holding more of a token than its synced reserve.
///
/// Addresses are kept as strings so candidates read back from the snapshot
/// file can be validated before use. `surplus_amount` is in native units (ETH/BNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub pool_address: String,
    pub token_address: String,
    pub surplus_amount: Decimal,
}

impl Candidate {
    pub fn new(pool: Address, token: Address, surplus_amount: Decimal) -> Self {
        Self {
            pool_address: pool.to_string(),
            token_address: token.to_string(),
            surplus_amount: surplus_amount.normalize(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.pool_address, self.token_address, self.surplus_amount
        )
    }
}

/// Skim transaction ready for the chain-write collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u128,
    pub data: Bytes,
    pub chain_id: u64,
    /// Filled by the live chain client at submit time when `None`
    pub nonce: Option<u64>,
}

/// Result of a transaction submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTx {
    pub hash: B256,
    pub dry_run: bool,
}

impl SubmittedTx {
    pub fn dry_run() -> Self {
        Self {
            hash: DRY_RUN_TX_HASH,
            dry_run: true,
        }
    }
}

/// Category of an error record kept in the metrics error ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PairCheck,
    Discovery,
    Execution,
    Snapshot,
    General,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::PairCheck => write!(f, "pair_check"),
            ErrorKind::Discovery => write!(f, "discovery"),
            ErrorKind::Execution => write!(f, "execution"),
            ErrorKind::Snapshot => write!(f, "snapshot"),
            ErrorKind::General => write!(f, "general"),
        }
    }
}
