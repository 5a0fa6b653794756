//! N-of-operators approval records.
//!
//! Approvals arrive as ordinary calls against a shared record keyed by an
//! operation fingerprint. Each call is split in two steps:
//!
//! 1. [`ApprovalQuorum::record_approval`] always records the caller
//! 2. [`ApprovalQuorum::take_if_ready`] hands back the record once the
//!    threshold is reached
//!
//! The call whose approval reaches the threshold takes the record and runs
//! the effect; there is no separate execute step.
//!
//! Fingerprints include the logical time of the call, so two otherwise
//! identical requests made at different times never share a record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::roles::CapabilitySet;
use crate::error::{Error, Result};
use crate::utils::crypto::{Address, OperationId};

/// Fingerprint tag for quorum-gated collateral removal
pub const REMOVE_COLLATERAL_TAG: &str = "treasury.remove_collateral";

/// Fingerprint tag for quorum-gated emergency payout
pub const EMERGENCY_WITHDRAW_TAG: &str = "treasury.emergency_withdraw";

/// Fingerprint of a collateral removal issued at `timestamp`
pub fn removal_fingerprint(amount: u64, recipient: &Address, reason: &str, timestamp: u64) -> OperationId {
    OperationId::builder(REMOVE_COLLATERAL_TAG)
        .u64(amount)
        .address(recipient)
        .text(reason)
        .u64(timestamp)
        .finish()
}

/// Fingerprint of an emergency payout issued at `timestamp`
pub fn payout_fingerprint(amount: u64, recipient: &Address, timestamp: u64) -> OperationId {
    OperationId::builder(EMERGENCY_WITHDRAW_TAG)
        .u64(amount)
        .address(recipient)
        .u64(timestamp)
        .finish()
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPROVAL RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// Approvals gathered for one fingerprint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// Number of distinct approvals
    pub count: u32,
    /// Who approved
    pub approvers: BTreeSet<Address>,
}

/// Result of recording an approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalOutcome {
    /// Threshold not reached; nothing executed
    Pending {
        /// Approvals so far
        approvals: u32,
        /// Approvals needed
        required: u32,
    },
    /// This call reached the threshold and the effect ran
    Executed,
}

impl ApprovalOutcome {
    /// Whether the gated effect ran
    pub fn executed(&self) -> bool {
        matches!(self, ApprovalOutcome::Executed)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPROVAL QUORUM
// ═══════════════════════════════════════════════════════════════════════════════

/// Fingerprint-keyed approval records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalQuorum {
    records: BTreeMap<OperationId, ApprovalRecord>,
}

impl ApprovalQuorum {
    /// Create an empty quorum book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `approver`'s approval; returns the new count
    pub fn record_approval(
        &mut self,
        id: OperationId,
        approver: Address,
        capabilities: CapabilitySet,
    ) -> Result<u32> {
        if !capabilities.can_approve() {
            tracing::warn!("Approval from non-operator {} rejected", approver);
            return Err(Error::NotOperator(approver.to_string()));
        }

        let record = self.records.entry(id).or_default();
        if record.approvers.contains(&approver) {
            return Err(Error::DuplicateApproval(id.to_string()));
        }

        record.approvers.insert(approver);
        record.count += 1;

        tracing::debug!("Approval {} of {} recorded for {}", record.count, id, approver);
        Ok(record.count)
    }

    /// Whether the fingerprint has reached `required` approvals
    pub fn is_ready(&self, id: &OperationId, required: u32) -> bool {
        self.approval_count(id) >= required
    }

    /// Remove and return the record if it has reached `required` approvals
    pub fn take_if_ready(&mut self, id: &OperationId, required: u32) -> Option<ApprovalRecord> {
        if self.is_ready(id, required) {
            self.records.remove(id)
        } else {
            None
        }
    }

    /// Approvals recorded for a fingerprint
    pub fn approval_count(&self, id: &OperationId) -> u32 {
        self.records.get(id).map(|r| r.count).unwrap_or(0)
    }

    /// Whether `who` approved a fingerprint
    pub fn has_approved(&self, id: &OperationId, who: &Address) -> bool {
        self.records
            .get(id)
            .map(|r| r.approvers.contains(who))
            .unwrap_or(false)
    }

    /// Record for a fingerprint, if any approvals are outstanding
    pub fn record(&self, id: &OperationId) -> Option<&ApprovalRecord> {
        self.records.get(id)
    }

    /// Fingerprints with outstanding approvals
    pub fn pending_operations(&self) -> Vec<OperationId> {
        self.records.keys().copied().collect()
    }
}
