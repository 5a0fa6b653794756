//! Withdrawal timelock.
//!
//! A withdrawal is requested first and may only be executed once the delay
//! has elapsed. Requests are keyed by a fingerprint of requester, amount,
//! reason and request time, and move `Requested -> Executed` exactly once.
//! The delay is a minimum waiting time, not an expiry window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::utils::crypto::{Address, OperationId};

/// Fingerprint tag for withdrawal requests
pub const WITHDRAWAL_TAG: &str = "treasury.withdrawal";

/// Fingerprint of a withdrawal request
pub fn withdrawal_fingerprint(requester: &Address, amount: u64, reason: &str, timestamp: u64) -> OperationId {
    OperationId::builder(WITHDRAWAL_TAG)
        .address(requester)
        .u64(amount)
        .text(reason)
        .u64(timestamp)
        .finish()
}

// ═══════════════════════════════════════════════════════════════════════════════
// WITHDRAWAL REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// A recorded withdrawal intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Who asked; receives the payout
    pub requester: Address,
    /// Amount of reserve to pay out
    pub amount: u64,
    /// Logical time of the request
    pub request_time: u64,
    /// Terminal flag
    pub executed: bool,
    /// Free-form justification
    pub reason: String,
}

impl WithdrawalRequest {
    /// Earliest execution time under `delay`
    pub fn due_time(&self, delay: u64) -> u64 {
        self.request_time.saturating_add(delay)
    }

    /// Check if the request can execute at `now`
    pub fn can_execute(&self, now: u64, delay: u64) -> bool {
        !self.executed && now >= self.due_time(delay)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WITHDRAWAL TIMELOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Queue of withdrawal requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalTimelock {
    requests: BTreeMap<OperationId, WithdrawalRequest>,
    delay: u64,
}

impl WithdrawalTimelock {
    /// Create with a delay in seconds
    pub fn new(delay: u64) -> Self {
        Self {
            requests: BTreeMap::new(),
            delay,
        }
    }

    /// Current delay
    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Change the delay; applies to pending requests too
    pub fn set_delay(&mut self, delay: u64) {
        self.delay = delay;
    }

    /// Record a request; no balance check happens here
    pub fn request(&mut self, requester: Address, amount: u64, reason: &str, now: u64) -> Result<OperationId> {
        let id = withdrawal_fingerprint(&requester, amount, reason, now);
        if self.requests.contains_key(&id) {
            return Err(Error::InvalidConfiguration(format!("withdrawal {} already requested", id)));
        }

        self.requests.insert(
            id,
            WithdrawalRequest {
                requester,
                amount,
                request_time: now,
                executed: false,
                reason: reason.to_string(),
            },
        );
        Ok(id)
    }

    /// Check a request is executable at `now` without changing it
    pub fn check_executable(&self, id: &OperationId, now: u64) -> Result<&WithdrawalRequest> {
        let request = self
            .requests
            .get(id)
            .ok_or_else(|| Error::RequestNotFound(id.to_string()))?;

        if request.executed {
            return Err(Error::AlreadyExecuted(id.to_string()));
        }

        let due = request.due_time(self.delay);
        if now < due {
            return Err(Error::NotYetDue { now, due });
        }

        Ok(request)
    }

    /// Transition a request to executed; returns a copy of it
    pub fn mark_executed(&mut self, id: &OperationId, now: u64) -> Result<WithdrawalRequest> {
        self.check_executable(id, now)?;
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| Error::RequestNotFound(id.to_string()))?;
        request.executed = true;
        Ok(request.clone())
    }

    /// Get a request
    pub fn get(&self, id: &OperationId) -> Option<&WithdrawalRequest> {
        self.requests.get(id)
    }

    /// Requests not yet executed
    pub fn pending(&self) -> Vec<(OperationId, &WithdrawalRequest)> {
        self.requests
            .iter()
            .filter(|(_, r)| !r.executed)
            .map(|(id, r)| (*id, r))
            .collect()
    }

    /// Requests executable at `now`
    pub fn ready(&self, now: u64) -> Vec<OperationId> {
        self.requests
            .iter()
            .filter(|(_, r)| r.can_execute(now, self.delay))
            .map(|(id, _)| *id)
            .collect()
    }
}
