//! Fee accounting and distribution.
//!
//! Fees are pulled into the treasury by authorized callers and later split
//! three ways by basis-point shares:
//!
//! - **Stability share**: credited to the stability fund (no transfer)
//! - **Governance share**: paid to the governance address
//! - **Development share**: paid to the owner
//!
//! Each component is truncated independently; the rounding remainder is not
//! reconciled and is counted as distributed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::constants::*;
use crate::utils::crypto::Address;
use crate::utils::math::{bps_share, checked_add};

// ═══════════════════════════════════════════════════════════════════════════════
// FEE KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// What a collected fee was charged for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeKind {
    /// Pegged-token issuance
    Minting,
    /// Pegged-token redemption
    Burning,
    /// Liquidation penalty
    Liquidation,
    /// Anything else
    Other,
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeeKind::Minting => "minting",
            FeeKind::Burning => "burning",
            FeeKind::Liquidation => "liquidation",
            FeeKind::Other => "other",
        };
        f.write_str(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEE STRUCTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Fee rates and distribution shares, all in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    /// Rate charged on issuance (informational)
    pub minting_fee: u64,
    /// Rate charged on redemption (informational)
    pub burning_fee: u64,
    /// Rate charged on liquidation (informational)
    pub liquidation_fee: u64,
    /// Share credited to the stability fund
    pub stability_share: u64,
    /// Share paid to governance
    pub governance_share: u64,
    /// Share paid to development (owner)
    pub development_share: u64,
}

impl Default for FeeStructure {
    fn default() -> Self {
        Self {
            minting_fee: DEFAULT_MINTING_FEE_BPS,
            burning_fee: DEFAULT_BURNING_FEE_BPS,
            liquidation_fee: DEFAULT_LIQUIDATION_FEE_BPS,
            stability_share: DEFAULT_STABILITY_SHARE_BPS,
            governance_share: DEFAULT_GOVERNANCE_SHARE_BPS,
            development_share: DEFAULT_DEVELOPMENT_SHARE_BPS,
        }
    }
}

impl FeeStructure {
    /// Shares must sum to exactly 10000 basis points
    pub fn validate(&self) -> Result<()> {
        let total = self.stability_share as u128
            + self.governance_share as u128
            + self.development_share as u128;
        if total != BPS_DIVISOR as u128 {
            return Err(Error::InvalidConfiguration(format!(
                "fee shares sum to {} bps, expected {}",
                total, BPS_DIVISOR
            )));
        }
        Ok(())
    }

    /// Rate for a kind of fee (`Other` has no published rate)
    pub fn rate(&self, kind: FeeKind) -> u64 {
        match kind {
            FeeKind::Minting => self.minting_fee,
            FeeKind::Burning => self.burning_fee,
            FeeKind::Liquidation => self.liquidation_fee,
            FeeKind::Other => 0,
        }
    }

    /// Fee an external caller should charge on `amount`
    pub fn quote(&self, kind: FeeKind, amount: u64) -> Result<u64> {
        bps_share(amount, self.rate(kind))
    }

    /// Split an amount by the configured shares
    pub fn split(&self, amount: u64) -> Result<FeeSplit> {
        Ok(FeeSplit {
            stability: bps_share(amount, self.stability_share)?,
            governance: bps_share(amount, self.governance_share)?,
            development: bps_share(amount, self.development_share)?,
        })
    }
}

/// Result of splitting undistributed fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Credited to the stability fund
    pub stability: u64,
    /// Paid to governance
    pub governance: u64,
    /// Paid to the owner
    pub development: u64,
}

impl FeeSplit {
    /// Sum of the three components (may trail the input by rounding)
    pub fn total(&self) -> u64 {
        self.stability + self.governance + self.development
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEE ACCOUNTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Running fee totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccounting {
    /// Cumulative fees per source
    collected_fees: BTreeMap<Address, u64>,
    /// All fees ever collected
    pub total_fees_collected: u64,
    /// All fees ever distributed
    pub total_fees_distributed: u64,
}

impl FeeAccounting {
    /// Record a collected fee
    pub fn record_collection(&mut self, source: Address, amount: u64) -> Result<()> {
        let total = checked_add(self.total_fees_collected, amount, "total fees collected")?;
        let from_source = checked_add(self.fees_from(&source), amount, "source fees")?;
        self.total_fees_collected = total;
        self.collected_fees.insert(source, from_source);
        Ok(())
    }

    /// Fees collected but not yet distributed
    pub fn undistributed(&self) -> u64 {
        self.total_fees_collected - self.total_fees_distributed
    }

    /// Mark all undistributed fees as distributed; returns the amount
    pub fn take_undistributed(&mut self) -> Result<u64> {
        let amount = self.undistributed();
        if amount == 0 {
            return Err(Error::NoWorkToDo);
        }
        self.total_fees_distributed = self.total_fees_collected;
        Ok(amount)
    }

    /// Cumulative fees from one source
    pub fn fees_from(&self, source: &Address) -> u64 {
        self.collected_fees.get(source).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_structure_is_valid() {
        assert!(FeeStructure::default().validate().is_ok());
    }

    #[test]
    fn test_validate_shares() {
        let mut fees = FeeStructure::default();
        fees.stability_share = 6000;
        assert!(matches!(fees.validate(), Err(Error::InvalidConfiguration(_))));

        fees.governance_share = 3000;
        assert!(fees.validate().is_ok());

        // Overflowing shares are rejected, not wrapped
        fees.stability_share = u64::MAX;
        assert!(fees.validate().is_err());
    }

    #[test]
    fn test_default_split() {
        let split = FeeStructure::default().split(100).unwrap();
        assert_eq!(split, FeeSplit { stability: 70, governance: 20, development: 10 });
        assert_eq!(split.total(), 100);
    }

    #[test]
    fn test_split_truncates_each_component() {
        let fees = FeeStructure {
            stability_share: 3333,
            governance_share: 3333,
            development_share: 3334,
            ..Default::default()
        };
        let split = fees.split(10).unwrap();
        assert_eq!(split, FeeSplit { stability: 3, governance: 3, development: 3 });
        assert_eq!(split.total(), 9);
    }

    #[test]
    fn test_quote() {
        let fees = FeeStructure::default();
        assert_eq!(fees.quote(FeeKind::Liquidation, 10_000).unwrap(), 500);
        assert_eq!(fees.quote(FeeKind::Minting, 10_000).unwrap(), 10);
        assert_eq!(fees.quote(FeeKind::Other, 10_000).unwrap(), 0);
    }

    #[test]
    fn test_accounting() {
        let source = Address::from_label("minter");
        let mut accounting = FeeAccounting::default();

        assert_eq!(accounting.take_undistributed(), Err(Error::NoWorkToDo));

        accounting.record_collection(source, 60).unwrap();
        accounting.record_collection(source, 40).unwrap();
        assert_eq!(accounting.fees_from(&source), 100);
        assert_eq!(accounting.undistributed(), 100);

        assert_eq!(accounting.take_undistributed().unwrap(), 100);
        assert_eq!(accounting.total_fees_distributed, 100);
        assert!(accounting.total_fees_distributed <= accounting.total_fees_collected);
        assert_eq!(accounting.take_undistributed(), Err(Error::NoWorkToDo));
    }
}
