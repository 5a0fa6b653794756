//! Collateral ledger.
//!
//! Tracks the reserve asset the treasury custodies. The figures always satisfy
//! `allocated_collateral + available_collateral == total_reserves`; every
//! mutation below checks its precondition before touching any field.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::MIN_BACKING_RATIO;
use crate::utils::math::{backing_ratio, checked_add, checked_sub};
use crate::utils::validation::validate_sufficient;

/// Reserve figures held by the treasury
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralState {
    /// All reserve held against the pegged supply
    pub total_reserves: u64,
    /// Reserve earmarked for backing
    pub allocated_collateral: u64,
    /// Reserve free to allocate or withdraw
    pub available_collateral: u64,
    /// Reserved for a future buffer policy; no operation changes it
    pub emergency_buffer: u64,
    /// Logical time of the last ledger change
    pub last_update_time: u64,
}

impl CollateralState {
    /// Check the allocation invariant
    pub fn is_balanced(&self) -> bool {
        self.allocated_collateral as u128 + self.available_collateral as u128
            == self.total_reserves as u128
    }

    /// Credit a deposit to total and available reserve
    pub fn credit(&mut self, amount: u64, now: u64) -> Result<()> {
        let total = checked_add(self.total_reserves, amount, "total reserves")?;
        let available = checked_add(self.available_collateral, amount, "available collateral")?;
        self.total_reserves = total;
        self.available_collateral = available;
        self.last_update_time = now;
        Ok(())
    }

    /// Move reserve from available to allocated
    pub fn allocate(&mut self, amount: u64, now: u64) -> Result<()> {
        validate_sufficient("available collateral", amount, self.available_collateral)?;
        let allocated = checked_add(self.allocated_collateral, amount, "allocated collateral")?;
        self.available_collateral -= amount;
        self.allocated_collateral = allocated;
        self.last_update_time = now;
        Ok(())
    }

    /// Move reserve from allocated back to available
    pub fn deallocate(&mut self, amount: u64, now: u64) -> Result<()> {
        validate_sufficient("allocated collateral", amount, self.allocated_collateral)?;
        let available = checked_add(self.available_collateral, amount, "available collateral")?;
        self.allocated_collateral -= amount;
        self.available_collateral = available;
        self.last_update_time = now;
        Ok(())
    }

    /// Debit reserve leaving the treasury; only available reserve can leave
    pub fn debit(&mut self, amount: u64, now: u64) -> Result<()> {
        validate_sufficient("available collateral", amount, self.available_collateral)?;
        let total = checked_sub(self.total_reserves, amount, "total reserves")?;
        self.available_collateral -= amount;
        self.total_reserves = total;
        self.last_update_time = now;
        Ok(())
    }

    /// Backing ratio against a pegged supply (`None` = no reference configured)
    pub fn backing_ratio(&self, peg_supply: Option<u64>) -> u128 {
        backing_ratio(self.total_reserves, peg_supply.unwrap_or(0))
    }

    /// Reject a removal that would leave the pegged supply under-backed
    pub fn check_removal_ratio(&self, amount: u64, peg_supply: Option<u64>) -> Result<()> {
        let remaining = self.total_reserves.saturating_sub(amount);
        let ratio = backing_ratio(remaining, peg_supply.unwrap_or(0));
        if ratio < MIN_BACKING_RATIO {
            return Err(Error::RatioViolation {
                ratio,
                minimum: MIN_BACKING_RATIO,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{RATIO_PRECISION, UNBOUNDED_RATIO};

    #[test]
    fn test_credit_allocate_deallocate() {
        let mut ledger = CollateralState::default();
        ledger.credit(1000, 10).unwrap();
        assert_eq!(ledger.total_reserves, 1000);
        assert_eq!(ledger.available_collateral, 1000);
        assert_eq!(ledger.last_update_time, 10);

        ledger.allocate(400, 11).unwrap();
        assert_eq!(ledger.allocated_collateral, 400);
        assert_eq!(ledger.available_collateral, 600);
        assert!(ledger.is_balanced());

        ledger.deallocate(400, 12).unwrap();
        assert_eq!(ledger.allocated_collateral, 0);
        assert_eq!(ledger.available_collateral, 1000);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn test_shortfalls_leave_state_untouched() {
        let mut ledger = CollateralState::default();
        ledger.credit(100, 1).unwrap();
        let before = ledger;

        assert!(matches!(ledger.allocate(101, 2), Err(Error::InsufficientFunds { .. })));
        assert!(matches!(ledger.deallocate(1, 2), Err(Error::InsufficientFunds { .. })));
        assert!(matches!(ledger.debit(101, 2), Err(Error::InsufficientFunds { .. })));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_debit_only_from_available() {
        let mut ledger = CollateralState::default();
        ledger.credit(100, 1).unwrap();
        ledger.allocate(80, 1).unwrap();

        assert!(ledger.debit(30, 2).is_err());
        ledger.debit(20, 2).unwrap();
        assert_eq!(ledger.total_reserves, 80);
        assert_eq!(ledger.available_collateral, 0);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn test_debit_on_unbalanced_figures_errors() {
        let mut ledger = CollateralState {
            total_reserves: 10,
            available_collateral: 100,
            ..Default::default()
        };
        assert!(matches!(ledger.debit(50, 2), Err(Error::Overflow { .. })));
        assert_eq!(ledger.total_reserves, 10);
        assert_eq!(ledger.available_collateral, 100);
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = CollateralState::default();
        ledger.credit(u64::MAX, 1).unwrap();
        assert!(matches!(ledger.credit(1, 2), Err(Error::Overflow { .. })));
        assert_eq!(ledger.total_reserves, u64::MAX);
    }

    #[test]
    fn test_backing_ratio() {
        let mut ledger = CollateralState::default();
        ledger.credit(1500, 1).unwrap();
        assert_eq!(ledger.backing_ratio(None), UNBOUNDED_RATIO);
        assert_eq!(ledger.backing_ratio(Some(0)), UNBOUNDED_RATIO);
        assert_eq!(ledger.backing_ratio(Some(1000)), RATIO_PRECISION * 3 / 2);
    }

    #[test]
    fn test_removal_ratio_check() {
        let mut ledger = CollateralState::default();
        ledger.credit(1500, 1).unwrap();

        // Exactly 100% after removal is allowed
        assert!(ledger.check_removal_ratio(500, Some(1000)).is_ok());
        assert!(matches!(
            ledger.check_removal_ratio(501, Some(1000)),
            Err(Error::RatioViolation { .. })
        ));

        // No reference, or nothing issued: anything goes
        assert!(ledger.check_removal_ratio(1500, None).is_ok());
        assert!(ledger.check_removal_ratio(1500, Some(0)).is_ok());
    }
}
