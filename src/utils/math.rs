//! Checked arithmetic for ledger figures.
//!
//! Amounts are `u64`; products that need headroom (ratios, basis-point splits)
//! are computed in `u128`.

use crate::error::{Error, Result};
use crate::utils::constants::{BPS_DIVISOR, RATIO_PRECISION, UNBOUNDED_RATIO};

/// Checked addition naming the figure that overflowed
pub fn checked_add(a: u64, b: u64, operation: &str) -> Result<u64> {
    a.checked_add(b).ok_or_else(|| Error::Overflow {
        operation: operation.to_string(),
    })
}

/// Checked subtraction naming the figure that underflowed
pub fn checked_sub(a: u64, b: u64, operation: &str) -> Result<u64> {
    a.checked_sub(b).ok_or_else(|| Error::Overflow {
        operation: operation.to_string(),
    })
}

/// Safe multiplication then division (rounds down)
pub fn safe_mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(Error::InvalidConfiguration("division by zero".into()));
    }
    let result = (a as u128) * (b as u128) / (c as u128);
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(result as u64)
}

/// Portion of `amount` given by `bps` basis points, truncated
pub fn bps_share(amount: u64, bps: u64) -> Result<u64> {
    safe_mul_div(amount, bps, BPS_DIVISOR)
}

/// Backing ratio `reserves * 1e18 / supply`, or the unbounded sentinel when
/// there is no supply to back
pub fn backing_ratio(reserves: u64, supply: u64) -> u128 {
    if supply == 0 {
        return UNBOUNDED_RATIO;
    }
    (reserves as u128) * RATIO_PRECISION / (supply as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_mul_div() {
        assert_eq!(safe_mul_div(100, 7000, 10000).unwrap(), 70);
        assert_eq!(safe_mul_div(u64::MAX, 2, 2).unwrap(), u64::MAX);
        assert!(safe_mul_div(u64::MAX, 2, 1).is_err());
        assert!(safe_mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn test_bps_share_truncates() {
        assert_eq!(bps_share(99, 1000).unwrap(), 9);
        assert_eq!(bps_share(99, 7000).unwrap(), 69);
    }

    #[test]
    fn test_backing_ratio() {
        assert_eq!(backing_ratio(1000, 1000), RATIO_PRECISION);
        assert_eq!(backing_ratio(500, 1000), RATIO_PRECISION / 2);
        assert_eq!(backing_ratio(u64::MAX, 1), (u64::MAX as u128) * RATIO_PRECISION);
        assert_eq!(backing_ratio(10, 0), UNBOUNDED_RATIO);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(checked_add(1, 2, "x").unwrap(), 3);
        assert!(matches!(checked_add(u64::MAX, 1, "total"), Err(Error::Overflow { .. })));
    }
}
