//! Treasury constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// RATIO CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-point scale for backing ratios (1e18 = 100%)
pub const RATIO_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Minimum backing ratio enforced on collateral removal - 100% (1:1)
pub const MIN_BACKING_RATIO: u128 = RATIO_PRECISION;

/// Ratio reported when no pegged supply exists to back
pub const UNBOUNDED_RATIO: u128 = u128::MAX;

// ═══════════════════════════════════════════════════════════════════════════════
// FEE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10000;

/// Default minting fee - 0.1%
pub const DEFAULT_MINTING_FEE_BPS: u64 = 10;

/// Default burning fee - 0.1%
pub const DEFAULT_BURNING_FEE_BPS: u64 = 10;

/// Default liquidation fee - 5%
pub const DEFAULT_LIQUIDATION_FEE_BPS: u64 = 500;

/// Default share of distributed fees credited to the stability fund - 70%
pub const DEFAULT_STABILITY_SHARE_BPS: u64 = 7000;

/// Default share of distributed fees paid to governance - 20%
pub const DEFAULT_GOVERNANCE_SHARE_BPS: u64 = 2000;

/// Default share of distributed fees paid to development (owner) - 10%
pub const DEFAULT_DEVELOPMENT_SHARE_BPS: u64 = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELOCK & QUORUM CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default delay between requesting and executing a withdrawal (2 days)
pub const DEFAULT_WITHDRAWAL_DELAY_SECS: u64 = 2 * 24 * 60 * 60;

/// Default number of operator approvals for gated operations
pub const DEFAULT_REQUIRED_APPROVALS: u32 = 2;

/// Default cap on a single stability fund deployment
pub const DEFAULT_MAX_DEPLOYMENT: u64 = 1_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a hash / operation fingerprint in bytes
pub const HASH_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shares_sum_to_whole() {
        assert_eq!(
            DEFAULT_STABILITY_SHARE_BPS + DEFAULT_GOVERNANCE_SHARE_BPS + DEFAULT_DEVELOPMENT_SHARE_BPS,
            BPS_DIVISOR
        );
    }

    #[test]
    fn test_ratio_constants() {
        assert_eq!(MIN_BACKING_RATIO, RATIO_PRECISION);
        assert!(UNBOUNDED_RATIO > MIN_BACKING_RATIO);
    }
}
