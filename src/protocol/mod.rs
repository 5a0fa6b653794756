//! Protocol module - treasury aggregate and orchestration.
//!
//! The [`Treasury`] owns every ledger and runs each public operation
//! atomically, emitting [`TreasuryEvent`]s on success.

pub mod events;
pub mod guard;
pub mod treasury;

pub use events::*;
pub use guard::*;
pub use treasury::*;
