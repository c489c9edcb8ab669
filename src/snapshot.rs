//! Candidate snapshot file
//!
//! Plain text, one candidate per line: `pool token surplus`. Every pass
//! overwrites the file, so it only ever reflects the latest discovery.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use crate::error::{HarvestError, HarvestResult};
use crate::types::Candidate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CandidateSnapshot {
    path: PathBuf,
}

impl CandidateSnapshot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `candidates`. An empty list leaves an empty file.
    pub fn write(&self, candidates: &[Candidate]) -> HarvestResult<()> {
        let mut body = String::new();
        for candidate in candidates {
            body.push_str(&candidate.to_string());
            body.push('\n');
        }

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, body).map_err(|e| {
            HarvestError::Snapshot(format!("write {}: {}", temp_path.display(), e))
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            HarvestError::Snapshot(format!("rename to {}: {}", self.path.display(), e))
        })?;

        debug!("Saved {} candidates to {}", candidates.len(), self.path.display());
        Ok(())
    }

    /// Rows of the latest snapshot. A missing file reads as no candidates.
    pub fn read(&self) -> HarvestResult<Vec<Candidate>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(HarvestError::Snapshot(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut candidates = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(candidate) => candidates.push(candidate),
                None => warn!(
                    "Skipping malformed line {} in {}: {}",
                    number + 1,
                    self.path.display(),
                    line
                ),
            }
        }
        Ok(candidates)
    }
}

/// Parse one `pool token surplus` row
pub fn parse_line(line: &str) -> Option<Candidate> {
    let mut parts = line.split_whitespace();
    let pool_address = parts.next()?.to_string();
    let token_address = parts.next()?.to_string();
    let surplus_amount = Decimal::from_str(parts.next()?).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Candidate {
        pool_address,
        token_address,
        surplus_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample(byte: u8, surplus: Decimal) -> Candidate {
        Candidate::new(Address::repeat_byte(byte), Address::repeat_byte(0xee), surplus)
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join("candidates.txt"));
        let candidates = vec![sample(0x02, dec!(0.5)), sample(0x01, dec!(0.02))];

        snapshot.write(&candidates).unwrap();
        assert_eq!(snapshot.read().unwrap(), candidates);
    }

    #[test]
    fn test_write_overwrites_previous_pass() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join("candidates.txt"));

        snapshot
            .write(&[sample(0x01, dec!(1)), sample(0x02, dec!(2))])
            .unwrap();
        snapshot.write(&[]).unwrap();

        assert_eq!(std::fs::read_to_string(snapshot.path()).unwrap(), "");
        assert!(snapshot.read().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join("absent.txt"));
        assert!(snapshot.read().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.txt");
        let good = sample(0x03, dec!(0.25));
        std::fs::write(
            &path,
            format!("garbage\n{}\n0xabc 0xdef not-a-number\n\n", good),
        )
        .unwrap();

        let rows = CandidateSnapshot::new(&path).read().unwrap();
        assert_eq!(rows, vec![good]);
    }

    #[test]
    fn test_write_to_missing_directory_is_snapshot_error() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join("nope").join("candidates.txt"));
        let err = snapshot.write(&[]).unwrap_err();
        assert!(matches!(err, HarvestError::Snapshot(_)));
    }
}
