//! Single-slot reentrancy lock.

use crate::error::{Error, Result};

/// Held for the duration of a guarded operation
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    /// Take the lock, failing if it is already held
    pub fn enter(&mut self) -> Result<()> {
        if self.entered {
            return Err(Error::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    /// Release the lock
    pub fn exit(&mut self) {
        self.entered = false;
    }

    /// Whether a guarded operation is in progress
    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_exit() {
        let mut guard = ReentrancyGuard::default();
        guard.enter().unwrap();
        assert!(guard.is_entered());
        assert_eq!(guard.enter(), Err(Error::Reentrancy));
        guard.exit();
        assert!(guard.enter().is_ok());
    }
}
