//! # Reserve Treasury
//!
//! Treasury ledger and authorization engine that custodies a reserve asset
//! backing a pegged liability token.
//!
//! ## Architecture
//!
//! - **Core**: roles, collateral ledger, fee accounting, stability fund, configuration
//! - **Governance**: operator approval quorum, withdrawal timelock, emergency flags
//! - **Protocol**: the [`Treasury`](protocol::Treasury) aggregate and its events
//! - **Storage**: checksummed JSON snapshots
//! - **CLI**: script replay and report formatting for the `treasury` binary
//!
//! ## Invariants
//!
//! - `allocated_collateral + available_collateral == total_reserves`
//! - Fee distribution shares sum to 10000 basis points
//! - `total_fees_distributed <= total_fees_collected`
//! - A withdrawal request executes at most once
//!
//! ## Example
//!
//! ```rust,ignore
//! use reserve_treasury::prelude::*;
//!
//! let mut treasury: Treasury<InMemoryAsset> =
//!     Treasury::new(treasury_addr, asset, owner, governance, emergency, &TreasuryConfig::default())?;
//!
//! treasury.deposit(&CallContext::new(depositor, now), 1_000)?;
//! treasury.allocate(&CallContext::new(owner, now), 400)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod cli;
pub mod core;
pub mod error;
pub mod governance;
pub mod protocol;
pub mod storage;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::TreasuryConfig,
        fees::{FeeKind, FeeStructure},
        ledger::CollateralState,
        roles::{Capability, RoleAuthority},
        stability::StabilityFund,
        token::{FixedSupply, FungibleAsset, InMemoryAsset, SupplySource},
    };
    pub use crate::error::{Error, Result};
    pub use crate::governance::{ApprovalOutcome, EmergencyFlags, WithdrawalRequest};
    pub use crate::protocol::{CallContext, EventLog, Treasury, TreasuryEvent, TreasuryState};
    pub use crate::storage::TreasurySnapshot;
    pub use crate::utils::crypto::{Address, Hash, OperationId};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name shown by the CLI
pub const PROTOCOL_NAME: &str = "Reserve Treasury";
