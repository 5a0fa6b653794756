//! Treasury events for state change notifications.
//!
//! Every successful state change appends one or more events to the treasury's
//! log. A failed operation leaves no events behind.

use serde::{Deserialize, Serialize};

use crate::core::fees::{FeeKind, FeeStructure};
use crate::utils::crypto::{Address, OperationId};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// All treasury event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryEvent {
    // Collateral events
    /// Reserve deposited
    Deposited {
        /// Depositor
        depositor: Address,
        /// Amount deposited
        amount: u64,
    },
    /// Reserve moved from available to allocated
    Allocated {
        /// Amount moved
        amount: u64,
    },
    /// Reserve moved from allocated to available
    Deallocated {
        /// Amount moved
        amount: u64,
    },
    /// Collateral removed after quorum
    CollateralRemoved {
        /// Receiver
        recipient: Address,
        /// Amount removed
        amount: u64,
        /// Stated reason
        reason: String,
    },
    /// Emergency payout after quorum
    EmergencyPayout {
        /// Receiver
        recipient: Address,
        /// Amount paid
        amount: u64,
    },

    // Fee events
    /// Fee pulled from a source
    FeesCollected {
        /// Who paid
        source: Address,
        /// Amount collected
        amount: u64,
        /// Fee category
        kind: FeeKind,
    },
    /// Undistributed fees split among stakeholders
    FeesDistributed {
        /// Undistributed amount at the time of the call
        total: u64,
        /// Credited to the stability fund
        stability: u64,
        /// Paid to governance
        governance: u64,
        /// Paid to the owner
        development: u64,
    },
    /// Fee structure replaced
    FeeStructureUpdated {
        /// New structure
        structure: FeeStructure,
    },

    // Stability fund events
    /// Stability funds sent out
    FundsDeployed {
        /// Receiver
        recipient: Address,
        /// Amount deployed
        amount: u64,
    },
    /// Stability funds returned
    FundsReplenished {
        /// Who returned them
        from: Address,
        /// Amount returned
        amount: u64,
    },
    /// Reserve funds moved into deployment
    EmergencyFundActivated {
        /// Amount activated
        amount: u64,
        /// Stated reason
        reason: String,
    },

    // Withdrawal events
    /// Withdrawal requested
    WithdrawalRequested {
        /// Request fingerprint
        id: OperationId,
        /// Requester
        requester: Address,
        /// Amount requested
        amount: u64,
        /// Stated reason
        reason: String,
    },
    /// Withdrawal paid out
    WithdrawalExecuted {
        /// Request fingerprint
        id: OperationId,
        /// Receiver
        requester: Address,
        /// Amount paid
        amount: u64,
    },
    /// Withdrawal cancelled (no operation produces this yet)
    WithdrawalCancelled {
        /// Request fingerprint
        id: OperationId,
    },

    // Quorum events
    /// Approval recorded against a fingerprint
    ApprovalRecorded {
        /// Operation fingerprint
        id: OperationId,
        /// Approver
        approver: Address,
        /// Approvals so far
        approvals: u32,
        /// Approvals needed
        required: u32,
    },
    /// Quorum-gated effect executed
    OperationExecuted {
        /// Operation fingerprint
        id: OperationId,
    },

    // Emergency events
    /// Treasury paused
    Paused {
        /// Who paused
        by: Address,
    },
    /// Treasury unpaused
    Unpaused {
        /// Who unpaused
        by: Address,
    },
    /// Freeze flags changed
    Frozen {
        /// Deposits accepted after the change
        deposits_enabled: bool,
        /// Removals allowed after the change
        withdrawals_enabled: bool,
    },

    // Role events
    /// Governance address replaced
    GovernanceUpdated {
        /// Old governance
        previous: Address,
        /// New governance
        current: Address,
    },
    /// Ownership handoff completed
    OwnershipTransferred {
        /// Old owner
        previous: Address,
        /// New owner
        current: Address,
    },
}

impl TreasuryEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "Deposited",
            Self::Allocated { .. } => "Allocated",
            Self::Deallocated { .. } => "Deallocated",
            Self::CollateralRemoved { .. } => "CollateralRemoved",
            Self::EmergencyPayout { .. } => "EmergencyPayout",
            Self::FeesCollected { .. } => "FeesCollected",
            Self::FeesDistributed { .. } => "FeesDistributed",
            Self::FeeStructureUpdated { .. } => "FeeStructureUpdated",
            Self::FundsDeployed { .. } => "FundsDeployed",
            Self::FundsReplenished { .. } => "FundsReplenished",
            Self::EmergencyFundActivated { .. } => "EmergencyFundActivated",
            Self::WithdrawalRequested { .. } => "WithdrawalRequested",
            Self::WithdrawalExecuted { .. } => "WithdrawalExecuted",
            Self::WithdrawalCancelled { .. } => "WithdrawalCancelled",
            Self::ApprovalRecorded { .. } => "ApprovalRecorded",
            Self::OperationExecuted { .. } => "OperationExecuted",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
            Self::Frozen { .. } => "Frozen",
            Self::GovernanceUpdated { .. } => "GovernanceUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// An event stamped with the logical time it was emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Logical time of the emitting call
    pub timestamp: u64,
    /// The event
    pub event: TreasuryEvent,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Collection of events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Add an event to the log
    pub fn push(&mut self, timestamp: u64, event: TreasuryEvent) {
        self.records.push(EventRecord { timestamp, event });
    }

    /// Get all events
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Most recent event
    pub fn last(&self) -> Option<&TreasuryEvent> {
        self.records.last().map(|r| &r.event)
    }

    /// Get events of a specific type
    pub fn filter_by_type(&self, event_type: &str) -> Vec<&TreasuryEvent> {
        self.records
            .iter()
            .map(|r| &r.event)
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Count events of a specific type
    pub fn count(&self, event_type: &str) -> usize {
        self.filter_by_type(event_type).len()
    }

    /// Get the number of events
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop everything after the first `len` events
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Take all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        let event = TreasuryEvent::Deposited {
            depositor: Address::from_label("alice"),
            amount: 100,
        };
        assert_eq!(event.event_type(), "Deposited");

        let cancelled = TreasuryEvent::WithdrawalCancelled {
            id: OperationId::from_bytes([1u8; 32]),
        };
        assert_eq!(cancelled.event_type(), "WithdrawalCancelled");
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.push(1, TreasuryEvent::Allocated { amount: 5 });
        log.push(2, TreasuryEvent::Deallocated { amount: 5 });
        log.push(3, TreasuryEvent::Allocated { amount: 7 });

        assert_eq!(log.len(), 3);
        assert_eq!(log.count("Allocated"), 2);
        assert_eq!(log.records()[1].timestamp, 2);
        assert_eq!(log.last(), Some(&TreasuryEvent::Allocated { amount: 7 }));

        log.truncate(1);
        assert_eq!(log.len(), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = TreasuryEvent::Paused {
            by: Address::from_label("guardian"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with("{\"Paused\""));
        let back: TreasuryEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
