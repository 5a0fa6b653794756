//! Input validation helpers shared by the ledger components.

use crate::error::{Error, Result};
use crate::utils::crypto::Address;

/// Validate that an amount is non-zero
pub fn validate_non_zero(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(())
}

/// Validate that a role or recipient identity is not the zero address
pub fn validate_address(address: &Address, name: &str) -> Result<()> {
    if address.is_zero() {
        return Err(Error::InvalidConfiguration(format!("{} cannot be the zero address", name)));
    }
    Ok(())
}

/// Validate `amount <= available` for the named balance
pub fn validate_sufficient(bucket: &'static str, required: u64, available: u64) -> Result<()> {
    if required > available {
        return Err(Error::InsufficientFunds {
            bucket,
            required,
            available,
        });
    }
    Ok(())
}
