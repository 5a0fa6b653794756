//! Core modules for the reserve treasury.
//!
//! This module contains the ledger building blocks:
//! - Configuration
//! - Role authority and capabilities
//! - Collateral ledger
//! - Fee accounting and distribution shares
//! - Stability fund sub-ledger
//! - Asset collaborator interfaces

pub mod config;
pub mod fees;
pub mod ledger;
pub mod roles;
pub mod stability;
pub mod token;

pub use config::*;
pub use fees::*;
pub use ledger::*;
pub use roles::*;
pub use stability::*;
pub use token::*;
