//! JSON snapshots of treasury state.
//!
//! A snapshot carries the full [`TreasuryState`], the reserve asset handle and
//! a SHA256 checksum of the state. Loading verifies the format version, the
//! checksum and the ledger invariants before anything is restored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::token::{FungibleAsset, SupplySource};
use crate::error::{Error, Result};
use crate::protocol::treasury::{Treasury, TreasuryState};
use crate::utils::crypto::{Address, Hash};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Checksum over the canonical JSON encoding of the state
pub fn state_checksum(state: &TreasuryState) -> Result<Hash> {
    let bytes = serde_json::to_vec(state)?;
    Ok(Hash::sha256(&bytes))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Saved treasury
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasurySnapshot<A> {
    /// Format version
    pub version: u32,
    /// Logical time the snapshot was taken
    pub taken_at: u64,
    /// Treasury account
    pub treasury: Address,
    /// Ledgers
    pub state: TreasuryState,
    /// Reserve asset handle
    pub reserve: A,
    /// Checksum of `state`
    pub checksum: Hash,
}

impl<A> TreasurySnapshot<A>
where
    A: FungibleAsset + Clone + Serialize + DeserializeOwned,
{
    /// Capture a treasury's current state
    pub fn capture<P: SupplySource>(treasury: &Treasury<A, P>, taken_at: u64) -> Result<Self> {
        let state = treasury.state().clone();
        let checksum = state_checksum(&state)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            taken_at,
            treasury: treasury.address(),
            state,
            reserve: treasury.reserve().clone(),
            checksum,
        })
    }

    /// Check version, checksum and state invariants
    pub fn verify(&self) -> Result<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(Error::Serialization(format!(
                "snapshot version {} not supported (max: {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        let actual = state_checksum(&self.state)?;
        if actual != self.checksum {
            return Err(Error::Serialization(format!(
                "snapshot checksum mismatch: expected {}, got {}",
                self.checksum, actual
            )));
        }
        self.state.validate()
    }

    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!("Snapshot saved to {}", path.display());
        Ok(())
    }

    /// Read and verify
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&json)?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    /// Rebuild a treasury; the peg reference is not part of the snapshot
    pub fn restore<P: SupplySource>(self, peg: Option<P>) -> Result<Treasury<A, P>> {
        self.verify()?;
        Treasury::from_parts(self.treasury, self.state, self.reserve, peg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TreasuryConfig;
    use crate::core::token::{FixedSupply, InMemoryAsset};
    use crate::protocol::treasury::CallContext;
    use tempfile::tempdir;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn funded_treasury() -> Treasury<InMemoryAsset, FixedSupply> {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 1_000).unwrap();
        asset.approve(&addr("alice"), &addr("treasury"), 1_000).unwrap();

        let mut treasury = Treasury::new(
            addr("treasury"),
            asset,
            addr("owner"),
            addr("governance"),
            addr("emergency"),
            &TreasuryConfig::default(),
        )
        .unwrap();
        treasury.deposit(&CallContext::new(addr("alice"), 1), 600).unwrap();
        treasury.allocate(&CallContext::new(addr("owner"), 2), 200).unwrap();
        treasury
    }

    #[test]
    fn test_save_load_restore() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("treasury.json");

        let treasury = funded_treasury();
        TreasurySnapshot::capture(&treasury, 3).unwrap().save(&path).unwrap();

        let loaded = TreasurySnapshot::<InMemoryAsset>::load(&path).unwrap();
        assert_eq!(loaded.taken_at, 3);

        let restored = loaded.restore(Some(FixedSupply(100))).unwrap();
        assert_eq!(restored.collateral_state(), treasury.collateral_state());
        assert_eq!(restored.reserve().balance_of(&addr("treasury")), 600);
        assert_eq!(restored.roles().owner(), addr("owner"));
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let treasury = funded_treasury();
        let mut snapshot = TreasurySnapshot::capture(&treasury, 3).unwrap();
        snapshot.state.collateral.total_reserves += 1;

        assert!(matches!(snapshot.verify(), Err(Error::Serialization(_))));
    }

    fn resealed(mut snapshot: TreasurySnapshot<InMemoryAsset>) -> TreasurySnapshot<InMemoryAsset> {
        snapshot.checksum = state_checksum(&snapshot.state).unwrap();
        snapshot
    }

    #[test]
    fn test_resealed_unbalanced_ledger_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("treasury.json");

        let treasury = funded_treasury();
        let mut snapshot = TreasurySnapshot::capture(&treasury, 3).unwrap();
        snapshot.state.collateral.total_reserves = 10;
        resealed(snapshot.clone()).save(&path).unwrap();

        let result = TreasurySnapshot::<InMemoryAsset>::load(&path);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(resealed(snapshot).restore(None::<FixedSupply>).is_err());
    }

    #[test]
    fn test_resealed_bad_configuration_rejected() {
        let treasury = funded_treasury();

        let mut shares = TreasurySnapshot::capture(&treasury, 3).unwrap();
        shares.state.fee_structure.stability_share += 1;
        assert!(resealed(shares).verify().is_err());

        let mut fees = TreasurySnapshot::capture(&treasury, 3).unwrap();
        fees.state.fees.total_fees_distributed = fees.state.fees.total_fees_collected + 1;
        assert!(matches!(resealed(fees).verify(), Err(Error::InvalidConfiguration(_))));

        let mut fund = TreasurySnapshot::capture(&treasury, 3).unwrap();
        fund.state.stability.deployed_funds = 1;
        assert!(matches!(resealed(fund).verify(), Err(Error::InvalidConfiguration(_))));

        let mut quorum = TreasurySnapshot::capture(&treasury, 3).unwrap();
        let mut value = serde_json::to_value(&quorum.state).unwrap();
        value["roles"]["required_approvals"] = serde_json::json!(0);
        quorum.state = serde_json::from_value(value).unwrap();
        assert!(matches!(resealed(quorum).verify(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let treasury = funded_treasury();
        let mut snapshot = TreasurySnapshot::capture(&treasury, 3).unwrap();
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(snapshot.verify().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = TreasurySnapshot::<InMemoryAsset>::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
