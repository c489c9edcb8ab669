//! Candidate sanity checks. Pure, never fails loudly.

use crate::types::Candidate;
use rust_decimal::Decimal;

/// `0x` followed by exactly 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate(candidate: &Candidate) -> bool {
    is_valid_address(&candidate.pool_address)
        && is_valid_address(&candidate.token_address)
        && candidate.surplus_amount > Decimal::ZERO
}
