//! Stability fund sub-ledger.
//!
//! Funds earmarked for market-stabilizing deployments, kept apart from the
//! backing reserve figures. Replenishment first retires deployed funds and
//! credits any excess to the fund total; nothing relates a replenishment to
//! what was actually deployed, so callers can over-replenish.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::constants::DEFAULT_MAX_DEPLOYMENT;
use crate::utils::math::checked_add;
use crate::utils::validation::validate_sufficient;

/// Stability fund figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityFund {
    /// Funds attributed to the stability fund
    pub total_funds: u64,
    /// Funds currently deployed to market operations
    pub deployed_funds: u64,
    /// Emergency reserve; no present operation credits it
    pub reserve_funds: u64,
    /// Cap on a single deployment
    pub max_deployment: u64,
    /// Logical time of the last deployment
    pub last_deployment_time: u64,
}

impl Default for StabilityFund {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPLOYMENT)
    }
}

impl StabilityFund {
    /// Create an empty fund with a deployment cap
    pub fn new(max_deployment: u64) -> Self {
        Self {
            total_funds: 0,
            deployed_funds: 0,
            reserve_funds: 0,
            max_deployment,
            last_deployment_time: 0,
        }
    }

    /// Funds not currently deployed
    pub fn deployable(&self) -> u64 {
        self.total_funds.saturating_sub(self.deployed_funds)
    }

    /// Credit distributed fees to the fund
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.total_funds = checked_add(self.total_funds, amount, "stability fund total")?;
        Ok(())
    }

    /// Deploy funds, bounded by what is undeployed and by the cap
    pub fn deploy(&mut self, amount: u64, now: u64) -> Result<()> {
        validate_sufficient("stability funds", amount, self.deployable())?;
        validate_sufficient("deployment cap", amount, self.max_deployment)?;
        self.deployed_funds += amount;
        self.last_deployment_time = now;
        Ok(())
    }

    /// Retire deployed funds, crediting any excess to the total
    pub fn replenish(&mut self, amount: u64) -> Result<()> {
        if self.deployed_funds >= amount {
            self.deployed_funds -= amount;
        } else {
            let excess = amount - self.deployed_funds;
            self.total_funds = checked_add(self.total_funds, excess, "stability fund total")?;
            self.deployed_funds = 0;
        }
        Ok(())
    }

    /// Move emergency reserve into deployment
    pub fn activate_reserve(&mut self, amount: u64) -> Result<()> {
        validate_sufficient("reserve funds", amount, self.reserve_funds)?;
        let deployed = checked_add(self.deployed_funds, amount, "deployed funds")?;
        self.reserve_funds -= amount;
        self.deployed_funds = deployed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_deploy_bounds() {
        let mut fund = StabilityFund::new(50);
        fund.credit(100).unwrap();

        assert!(matches!(fund.deploy(51, 1), Err(Error::InsufficientFunds { bucket: "deployment cap", .. })));
        fund.deploy(50, 1).unwrap();
        fund.deploy(50, 2).unwrap();
        assert_eq!(fund.deployed_funds, 100);
        assert_eq!(fund.last_deployment_time, 2);

        assert!(matches!(fund.deploy(1, 3), Err(Error::InsufficientFunds { bucket: "stability funds", .. })));
    }

    #[test]
    fn test_replenish_retires_deployment() {
        let mut fund = StabilityFund::new(100);
        fund.credit(100).unwrap();
        fund.deploy(60, 1).unwrap();

        fund.replenish(40).unwrap();
        assert_eq!(fund.deployed_funds, 20);
        assert_eq!(fund.total_funds, 100);
    }

    #[test]
    fn test_over_replenish_grows_total() {
        let mut fund = StabilityFund::new(100);
        fund.credit(100).unwrap();
        fund.deploy(30, 1).unwrap();

        fund.replenish(50).unwrap();
        assert_eq!(fund.deployed_funds, 0);
        assert_eq!(fund.total_funds, 120);
    }

    #[test]
    fn test_reserve_is_unfunded() {
        let mut fund = StabilityFund::default();
        assert!(matches!(fund.activate_reserve(1), Err(Error::InsufficientFunds { .. })));

        fund.reserve_funds = 10;
        fund.activate_reserve(10).unwrap();
        assert_eq!(fund.reserve_funds, 0);
        assert_eq!(fund.deployed_funds, 10);
    }
}
