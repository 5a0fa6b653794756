//! Authorization protocols layered over the ledger.
//!
//! - Quorum approval records for risky fund movements
//! - Timelock for delayed withdrawals
//! - Emergency pause and freeze flags
//!
//! # Quorum flow
//!
//! 1. An operator calls a gated operation; its approval is recorded
//! 2. Further operators call with the same parameters at the same logical time
//! 3. The call supplying the final approval executes the effect and clears the record

pub mod emergency;
pub mod quorum;
pub mod timelock;

pub use emergency::*;
pub use quorum::*;
pub use timelock::*;
