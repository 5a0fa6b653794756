//! Role authority for the treasury.
//!
//! Caller identities are evaluated once into a [`CapabilitySet`]; each
//! operation then declares the single [`Capability`] it requires.
//!
//! Ownership moves in two steps: the owner proposes a successor and only that
//! exact address can accept, so a mistyped address never takes control.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::crypto::Address;
use crate::utils::validation::validate_address;

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Capability an operation requires from its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Exactly the owner
    Owner,
    /// Governance or owner
    GovernanceOrOwner,
    /// Emergency address or owner
    EmergencyOrOwner,
    /// Owner, governance, an ecosystem peer, or any operator
    Authorized,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Owner => "owner",
            Capability::GovernanceOrOwner => "governance or owner",
            Capability::EmergencyOrOwner => "emergency or owner",
            Capability::Authorized => "authorized",
        };
        f.write_str(name)
    }
}

/// Roles a caller holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    /// Caller is the owner
    pub owner: bool,
    /// Caller is the governance address
    pub governance: bool,
    /// Caller is the emergency address
    pub emergency: bool,
    /// Caller is the manager or oracle peer
    pub peer: bool,
    /// Caller is a registered operator
    pub operator: bool,
}

impl CapabilitySet {
    /// Check whether this set meets a requirement
    pub fn satisfies(&self, required: Capability) -> bool {
        match required {
            Capability::Owner => self.owner,
            Capability::GovernanceOrOwner => self.owner || self.governance,
            Capability::EmergencyOrOwner => self.owner || self.emergency,
            Capability::Authorized => self.owner || self.governance || self.peer || self.operator,
        }
    }

    /// May approve quorum-gated operations
    pub fn can_approve(&self) -> bool {
        self.owner || self.operator
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROLE AUTHORITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identities holding treasury roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAuthority {
    owner: Address,
    pending_owner: Option<Address>,
    governance: Address,
    emergency: Address,
    operators: BTreeSet<Address>,
    required_approvals: u32,
    manager: Option<Address>,
    oracle: Option<Address>,
}

impl RoleAuthority {
    /// Create with the three fixed roles; the owner starts as the only operator
    pub fn new(
        owner: Address,
        governance: Address,
        emergency: Address,
        required_approvals: u32,
    ) -> Result<Self> {
        validate_address(&owner, "owner")?;
        validate_address(&governance, "governance")?;
        validate_address(&emergency, "emergency")?;
        if required_approvals == 0 {
            return Err(Error::InvalidConfiguration("required approvals must be positive".into()));
        }

        let mut operators = BTreeSet::new();
        operators.insert(owner);

        Ok(Self {
            owner,
            pending_owner: None,
            governance,
            emergency,
            operators,
            required_approvals,
            manager: None,
            oracle: None,
        })
    }

    /// Evaluate a caller into its capability set
    pub fn capabilities(&self, caller: &Address) -> CapabilitySet {
        CapabilitySet {
            owner: *caller == self.owner,
            governance: *caller == self.governance,
            emergency: *caller == self.emergency,
            peer: self.manager.as_ref() == Some(caller) || self.oracle.as_ref() == Some(caller),
            operator: self.operators.contains(caller),
        }
    }

    /// Fail with `Unauthorized` unless the caller meets `required`
    pub fn require(&self, caller: &Address, required: Capability) -> Result<()> {
        if self.capabilities(caller).satisfies(required) {
            Ok(())
        } else {
            tracing::warn!(%caller, %required, "rejected privileged call");
            Err(Error::Unauthorized(format!("{} requires {}", caller, required)))
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Successor awaiting acceptance
    pub fn pending_owner(&self) -> Option<Address> {
        self.pending_owner
    }

    /// Governance address
    pub fn governance(&self) -> Address {
        self.governance
    }

    /// Emergency address
    pub fn emergency(&self) -> Address {
        self.emergency
    }

    /// Whether `who` is an operator
    pub fn is_operator(&self, who: &Address) -> bool {
        self.operators.contains(who)
    }

    /// All operators in address order
    pub fn operators(&self) -> impl Iterator<Item = &Address> {
        self.operators.iter()
    }

    /// Approvals needed to execute a gated operation
    pub fn required_approvals(&self) -> u32 {
        self.required_approvals
    }

    /// Ecosystem manager peer
    pub fn manager(&self) -> Option<Address> {
        self.manager
    }

    /// Oracle peer (stored for authorization only)
    pub fn oracle(&self) -> Option<Address> {
        self.oracle
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MUTATIONS (authorization checked by the caller)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a pending successor
    pub fn propose_owner(&mut self, candidate: Address) -> Result<()> {
        validate_address(&candidate, "new owner")?;
        self.pending_owner = Some(candidate);
        Ok(())
    }

    /// Complete the handoff; returns the previous owner
    pub fn accept_ownership(&mut self, caller: &Address) -> Result<Address> {
        match self.pending_owner {
            Some(pending) if pending == *caller => {
                let previous = self.owner;
                self.owner = pending;
                self.pending_owner = None;
                Ok(previous)
            }
            _ => Err(Error::Unauthorized(format!("{} is not the pending owner", caller))),
        }
    }

    /// Replace governance; returns the previous address
    pub fn set_governance(&mut self, governance: Address) -> Result<Address> {
        validate_address(&governance, "governance")?;
        Ok(std::mem::replace(&mut self.governance, governance))
    }

    /// Replace the emergency address
    pub fn set_emergency(&mut self, emergency: Address) -> Result<()> {
        validate_address(&emergency, "emergency")?;
        self.emergency = emergency;
        Ok(())
    }

    /// Register an operator; returns false if already present
    pub fn add_operator(&mut self, operator: Address) -> Result<bool> {
        validate_address(&operator, "operator")?;
        Ok(self.operators.insert(operator))
    }

    /// Remove an operator; returns false if absent
    pub fn remove_operator(&mut self, operator: &Address) -> bool {
        self.operators.remove(operator)
    }

    /// Change the approval threshold
    pub fn set_required_approvals(&mut self, required: u32) -> Result<()> {
        if required == 0 {
            return Err(Error::InvalidConfiguration("required approvals must be positive".into()));
        }
        self.required_approvals = required;
        Ok(())
    }

    /// Wire the manager and oracle peers
    pub fn set_peers(&mut self, manager: Address, oracle: Address) -> Result<()> {
        validate_address(&manager, "manager")?;
        validate_address(&oracle, "oracle")?;
        self.manager = Some(manager);
        self.oracle = Some(oracle);
        Ok(())
    }
}
