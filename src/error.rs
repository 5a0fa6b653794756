//! Error types for the reserve treasury.
//!
//! Every failure aborts the whole operation. Callers receive a typed error
//! with a stable numeric code and a short machine-readable reason string.

use thiserror::Error;

/// Result type alias for treasury operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the reserve treasury
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Caller does not hold the capability the operation requires
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════
    // Quorum Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Approver is neither an operator nor the owner
    #[error("Not an operator: {0}")]
    NotOperator(String),

    /// Approver already approved this operation fingerprint
    #[error("Already approved operation {0}")]
    DuplicateApproval(String),

    // ═══════════════════════════════════════════════════════════════════
    // Emergency Flag Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Treasury is paused
    #[error("Treasury is paused")]
    EmergencyPaused,

    /// A frozen flow (deposits or withdrawals) was invoked
    #[error("Operation disabled: {0}")]
    OperationDisabled(String),

    // ═══════════════════════════════════════════════════════════════════
    // Funds Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Not enough funds in the ledger bucket or asset balance consulted
    #[error("Insufficient {bucket}: required {required}, available {available}")]
    InsufficientFunds {
        /// Which balance fell short
        bucket: &'static str,
        /// Requested amount
        required: u64,
        /// Amount actually available
        available: u64,
    },

    /// Removal would push the backing ratio under the minimum
    #[error("Backing ratio {ratio} below minimum {minimum}")]
    RatioViolation {
        /// Resulting ratio (1e18 = 100%)
        ratio: u128,
        /// Minimum ratio (1e18 = 100%)
        minimum: u128,
    },

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// The asset collaborator refused a transfer
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ═══════════════════════════════════════════════════════════════════
    // Timelock Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Withdrawal request was already executed
    #[error("Withdrawal {0} already executed")]
    AlreadyExecuted(String),

    /// Withdrawal delay has not elapsed
    #[error("Withdrawal not yet due: now {now}, due at {due}")]
    NotYetDue {
        /// Current logical time
        now: u64,
        /// Earliest execution time
        due: u64,
    },

    /// No withdrawal request with the given fingerprint
    #[error("Withdrawal request not found: {0}")]
    RequestNotFound(String),

    // ═══════════════════════════════════════════════════════════════════
    // Fee Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Nothing to distribute
    #[error("No undistributed fees")]
    NoWorkToDo,

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Re-entrant call into a guarded operation
    #[error("Reentrant call")]
    Reentrancy,

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Short machine-readable reason, stable across releases
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Unauthorized(_) => "Unauthorized",
            Error::NotOperator(_) => "Not operator",
            Error::DuplicateApproval(_) => "Already approved",
            Error::EmergencyPaused => "Paused",
            Error::OperationDisabled(_) => "Operation disabled",
            Error::InsufficientFunds { .. } => "Insufficient funds",
            Error::RatioViolation { .. } => "Would violate backing ratio",
            Error::ZeroAmount => "Amount must be positive",
            Error::TransferFailed(_) => "Transfer failed",
            Error::InvalidConfiguration(_) => "Invalid configuration",
            Error::AlreadyExecuted(_) => "Already executed",
            Error::NotYetDue { .. } => "Timelock not expired",
            Error::RequestNotFound(_) => "Request not found",
            Error::NoWorkToDo => "No fees to distribute",
            Error::Reentrancy => "Reentrant call",
            Error::Overflow { .. } => "Overflow",
            Error::Serialization(_) => "Serialization error",
            Error::Io(_) => "I/O error",
        }
    }

    /// Returns true if a fresh call may succeed once conditions change
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmergencyPaused
                | Error::OperationDisabled(_)
                | Error::InsufficientFunds { .. }
                | Error::NotYetDue { .. }
                | Error::NoWorkToDo
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Authorization errors: 1xxx
            Error::Unauthorized(_) => 1001,

            // Quorum errors: 2xxx
            Error::NotOperator(_) => 2001,
            Error::DuplicateApproval(_) => 2002,

            // Flag errors: 3xxx
            Error::EmergencyPaused => 3001,
            Error::OperationDisabled(_) => 3002,

            // Funds errors: 4xxx
            Error::InsufficientFunds { .. } => 4001,
            Error::RatioViolation { .. } => 4002,
            Error::ZeroAmount => 4003,
            Error::TransferFailed(_) => 4004,

            // Configuration errors: 5xxx
            Error::InvalidConfiguration(_) => 5001,

            // Timelock errors: 6xxx
            Error::AlreadyExecuted(_) => 6001,
            Error::NotYetDue { .. } => 6002,
            Error::RequestNotFound(_) => 6003,

            // Fee errors: 7xxx
            Error::NoWorkToDo => 7001,

            // Internal errors: 9xxx
            Error::Reentrancy => 9001,
            Error::Overflow { .. } => 9002,
            Error::Serialization(_) => 9003,
            Error::Io(_) => 9004,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::Unauthorized("".into()).code(),
            Error::NotOperator("".into()).code(),
            Error::DuplicateApproval("".into()).code(),
            Error::EmergencyPaused.code(),
            Error::OperationDisabled("".into()).code(),
            Error::InsufficientFunds { bucket: "x", required: 0, available: 0 }.code(),
            Error::RatioViolation { ratio: 0, minimum: 0 }.code(),
            Error::InvalidConfiguration("".into()).code(),
            Error::AlreadyExecuted("".into()).code(),
            Error::NotYetDue { now: 0, due: 0 }.code(),
            Error::NoWorkToDo.code(),
            Error::Reentrancy.code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientFunds {
            bucket: "available collateral",
            required: 1000,
            available: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("available collateral"));
        assert!(msg.contains("1000"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(Error::EmergencyPaused.reason(), "Paused");
        assert_eq!(Error::NotYetDue { now: 1, due: 2 }.reason(), "Timelock not expired");
        assert_eq!(Error::NoWorkToDo.reason(), "No fees to distribute");
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::NotYetDue { now: 0, due: 1 }.is_recoverable());
        assert!(!Error::Unauthorized("x".into()).is_recoverable());
        assert!(!Error::AlreadyExecuted("x".into()).is_recoverable());
    }
}
