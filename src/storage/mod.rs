//! Storage module for persistent treasury data.
//!
//! Treasury state persists as a single checksummed JSON snapshot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reserve_treasury::storage::TreasurySnapshot;
//!
//! TreasurySnapshot::capture(&treasury, now)?.save(path)?;
//! let treasury = TreasurySnapshot::<InMemoryAsset>::load(path)?.restore(None::<FixedSupply>)?;
//! ```

pub mod snapshot;

pub use snapshot::*;
