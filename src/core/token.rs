//! Asset collaborator interfaces.
//!
//! The treasury never owns external balances; it observes and moves them
//! through these traits:
//! - [`FungibleAsset`] for the reserve asset it custodies
//! - [`SupplySource`] for the pegged liability, read only for its supply
//!
//! [`InMemoryAsset`] implements both for tests and the simulator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::utils::crypto::Address;
use crate::utils::math::checked_add;

// ═══════════════════════════════════════════════════════════════════════════════
// TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything that reports a total supply
pub trait SupplySource {
    /// Total outstanding supply
    fn total_supply(&self) -> u64;
}

/// Standard fungible-asset interface
///
/// `transfer` moves funds owned by `from`, which is always the calling
/// account. A refused movement is an `Err`; there is no silent `false`.
pub trait FungibleAsset: SupplySource {
    /// Balance held by `account`
    fn balance_of(&self, account: &Address) -> u64;

    /// Move `amount` from the calling account `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(&mut self, spender: &Address, from: &Address, to: &Address, amount: u64) -> Result<()>;

    /// Set `spender`'s allowance over `owner`'s funds
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> Result<()>;

    /// Remaining allowance of `spender` over `owner`'s funds
    fn allowance(&self, owner: &Address, spender: &Address) -> u64;
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY ASSET
// ═══════════════════════════════════════════════════════════════════════════════

/// Ledger-backed asset used by tests and the simulator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryAsset {
    /// Display symbol
    pub symbol: String,
    total_supply: u64,
    balances: BTreeMap<Address, u64>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, u64>>,
    /// When set, every transfer is refused
    refuse_transfers: bool,
}

impl InMemoryAsset {
    /// Create an empty asset
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Credit new units to `to`
    pub fn mint(&mut self, to: &Address, amount: u64) -> Result<()> {
        let balance = checked_add(self.balance_of(to), amount, "mint balance")?;
        self.total_supply = checked_add(self.total_supply, amount, "mint supply")?;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Destroy units held by `from`
    pub fn burn(&mut self, from: &Address, amount: u64) -> Result<()> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    /// Toggle refusal of all transfers
    pub fn set_refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u128 = self.balances.values().map(|b| *b as u128).sum();
        sum == self.total_supply as u128
    }

    fn debit(&mut self, from: &Address, amount: u64) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::TransferFailed(format!(
                "{} balance {} below {}",
                from, balance, amount
            )));
        }
        if balance == amount {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, balance - amount);
        }
        Ok(())
    }

    fn move_funds(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        if self.refuse_transfers {
            return Err(Error::TransferFailed(format!("{} transfers refused", self.symbol)));
        }
        if from == to {
            return Ok(());
        }
        let credited = checked_add(self.balance_of(to), amount, "transfer balance")?;
        self.debit(from, amount)?;
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl SupplySource for InMemoryAsset {
    fn total_supply(&self) -> u64 {
        self.total_supply
    }
}

impl FungibleAsset for InMemoryAsset {
    fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        self.move_funds(from, to, amount)
    }

    fn transfer_from(&mut self, spender: &Address, from: &Address, to: &Address, amount: u64) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(Error::TransferFailed(format!(
                "allowance {} below {}",
                allowed, amount
            )));
        }
        self.move_funds(from, to, amount)?;
        self.allowances.entry(*from).or_default().insert(*spender, allowed - amount);
        Ok(())
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> Result<()> {
        self.allowances.entry(*owner).or_default().insert(*spender, amount);
        Ok(())
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }
}

/// Fixed supply figure, handy where only the pegged supply matters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSupply(pub u64);

impl SupplySource for FixedSupply {
    fn total_supply(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    #[test]
    fn test_mint_and_burn() {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 1000).unwrap();
        assert_eq!(asset.total_supply(), 1000);
        assert_eq!(asset.balance_of(&addr("alice")), 1000);

        asset.burn(&addr("alice"), 400).unwrap();
        assert_eq!(asset.total_supply(), 600);
        assert!(asset.burn(&addr("alice"), 601).is_err());
        assert!(asset.verify_supply_invariant());
    }

    #[test]
    fn test_transfer() {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 100).unwrap();

        asset.transfer(&addr("alice"), &addr("bob"), 30).unwrap();
        assert_eq!(asset.balance_of(&addr("alice")), 70);
        assert_eq!(asset.balance_of(&addr("bob")), 30);

        assert!(asset.transfer(&addr("bob"), &addr("alice"), 31).is_err());
        assert_eq!(asset.balance_of(&addr("bob")), 30);
        assert!(asset.verify_supply_invariant());
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 100).unwrap();
        asset.approve(&addr("alice"), &addr("vault"), 60).unwrap();

        asset.transfer_from(&addr("vault"), &addr("alice"), &addr("vault"), 50).unwrap();
        assert_eq!(asset.allowance(&addr("alice"), &addr("vault")), 10);
        assert_eq!(asset.balance_of(&addr("vault")), 50);

        let err = asset
            .transfer_from(&addr("vault"), &addr("alice"), &addr("vault"), 20)
            .unwrap_err();
        assert!(matches!(err, Error::TransferFailed(_)));
    }

    #[test]
    fn test_refused_transfers_leave_balances() {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 100).unwrap();
        asset.set_refuse_transfers(true);

        assert!(asset.transfer(&addr("alice"), &addr("bob"), 10).is_err());
        assert_eq!(asset.balance_of(&addr("alice")), 100);
    }
}
