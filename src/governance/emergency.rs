//! Emergency flags.
//!
//! Three independent switches: a global pause plus separate deposit and
//! withdrawal freezes. Which operations consult which flag is decided by the
//! treasury; the flags themselves carry no coupling.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pause and freeze switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyFlags {
    /// Global pause
    pub paused: bool,
    /// Deposits accepted
    pub deposits_enabled: bool,
    /// Quorum-gated removals allowed
    pub withdrawals_enabled: bool,
}

impl Default for EmergencyFlags {
    fn default() -> Self {
        Self {
            paused: false,
            deposits_enabled: true,
            withdrawals_enabled: true,
        }
    }
}

impl EmergencyFlags {
    /// Fail if paused
    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(Error::EmergencyPaused);
        }
        Ok(())
    }

    /// Fail if deposits are frozen
    pub fn ensure_deposits_enabled(&self) -> Result<()> {
        if !self.deposits_enabled {
            return Err(Error::OperationDisabled("deposits disabled".into()));
        }
        Ok(())
    }

    /// Fail if withdrawals are frozen
    pub fn ensure_withdrawals_enabled(&self) -> Result<()> {
        if !self.withdrawals_enabled {
            return Err(Error::OperationDisabled("withdrawals disabled".into()));
        }
        Ok(())
    }

    /// Set both freeze switches at once
    pub fn freeze(&mut self, deposits_off: bool, withdrawals_off: bool) {
        self.deposits_enabled = !deposits_off;
        self.withdrawals_enabled = !withdrawals_off;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_open() {
        let flags = EmergencyFlags::default();
        assert!(flags.ensure_not_paused().is_ok());
        assert!(flags.ensure_deposits_enabled().is_ok());
        assert!(flags.ensure_withdrawals_enabled().is_ok());
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = EmergencyFlags::default();
        flags.freeze(true, false);
        assert!(matches!(flags.ensure_deposits_enabled(), Err(Error::OperationDisabled(_))));
        assert!(flags.ensure_withdrawals_enabled().is_ok());
        assert!(flags.ensure_not_paused().is_ok());

        flags.paused = true;
        flags.freeze(false, true);
        assert!(flags.ensure_deposits_enabled().is_ok());
        assert!(flags.ensure_withdrawals_enabled().is_err());
        assert_eq!(flags.ensure_not_paused(), Err(Error::EmergencyPaused));
    }
}
