//! Error taxonomy for the harvesting pipeline
//!
//! Only `Configuration` is fatal, and only at startup. Every other variant is
//! recovered where it occurs: logged, recorded into the metrics error ring,
//! and the pass moves on.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// Chain read/write failure reported by the RPC provider
    #[error("provider error: {0}")]
    Provider(String),

    /// Malformed or non-positive candidate
    #[error("invalid candidate: {0}")]
    Validation(String),

    /// Missing signing key in live mode, bad thresholds, unparsable addresses
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transaction construction or submission failure
    #[error("execution failed: {0}")]
    Execution(String),

    /// Pool enumeration failure not tied to a single pool
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Candidate snapshot file could not be written or read
    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    pub fn provider(err: impl Display) -> Self {
        HarvestError::Provider(err.to_string())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, HarvestError::Configuration(_))
    }
}

pub type HarvestResult<T> = std::result::Result<T, HarvestError>;
