//! Scripted simulation.
//!
//! A script sets up an in-memory treasury, funds some accounts and then
//! replays a list of timed calls. Identities are written either as hex
//! addresses (`0x...`) or as labels hashed into addresses.
//!
//! ```json
//! {
//!   "owner": "owner", "governance": "gov", "emergency": "guardian",
//!   "balances": { "alice": 5000 },
//!   "steps": [
//!     { "at": 1, "caller": "alice", "call": { "deposit": { "amount": 1000 } } },
//!     { "at": 2, "caller": "owner", "call": { "allocate": { "amount": 400 } } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::config::TreasuryConfig;
use crate::core::fees::{FeeKind, FeeStructure};
use crate::core::token::{FixedSupply, FungibleAsset, InMemoryAsset};
use crate::error::Result;
use crate::governance::timelock::withdrawal_fingerprint;
use crate::protocol::events::EventRecord;
use crate::protocol::treasury::{CallContext, Treasury, TreasuryState};
use crate::utils::crypto::Address;

/// Default label of the treasury account
pub const DEFAULT_TREASURY_LABEL: &str = "treasury";

/// Resolve a hex address or a label
pub fn resolve_identity(identity: &str) -> Result<Address> {
    if identity.starts_with("0x") {
        Address::from_hex(identity)
    } else {
        Ok(Address::from_label(identity))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCRIPT MODEL
// ═══════════════════════════════════════════════════════════════════════════════

/// One treasury call; identities are resolved with [`resolve_identity`]
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCall {
    /// Deposit reserve
    Deposit { amount: u64 },
    /// Allocate available reserve
    Allocate { amount: u64 },
    /// Deallocate reserve
    Deallocate { amount: u64 },
    /// Approve or execute a collateral removal
    RemoveCollateral { amount: u64, recipient: String, reason: String },
    /// Approve or execute an emergency payout
    EmergencyWithdraw { amount: u64, recipient: String },
    /// Collect a fee
    CollectFees { source: String, amount: u64, kind: FeeKind },
    /// Distribute undistributed fees
    DistributeFees,
    /// Replace the fee structure
    UpdateFeeStructure { structure: FeeStructure },
    /// Deploy stability funds
    DeployStabilityFunds { amount: u64, recipient: String },
    /// Replenish the stability fund
    ReplenishStabilityFund { amount: u64 },
    /// Activate emergency reserve funds
    ActivateEmergencyFund { amount: u64, reason: String },
    /// Change the deployment cap
    SetMaxDeployment { amount: u64 },
    /// Request a withdrawal
    RequestWithdrawal { amount: u64, reason: String },
    /// Execute the withdrawal identified by its request parameters
    ExecuteWithdrawal { requester: String, amount: u64, reason: String, requested_at: u64 },
    /// Change the withdrawal delay
    SetWithdrawalDelay { secs: u64 },
    /// Pause
    Pause,
    /// Unpause
    Unpause,
    /// Set freeze flags
    Freeze { deposits_off: bool, withdrawals_off: bool },
    /// Offer ownership
    ProposeOwner { candidate: String },
    /// Accept ownership
    AcceptOwnership,
    /// Replace governance
    SetGovernance { governance: String },
    /// Add an operator
    AddOperator { operator: String },
    /// Remove an operator
    RemoveOperator { operator: String },
    /// Change the approval threshold
    SetRequiredApprovals { required: u32 },
    /// Replace the emergency role
    SetEmergency { emergency: String },
    /// Register the manager and oracle peers
    SetEcosystemPeers { manager: String, oracle: String },
    /// Install or clear the pegged supply
    SetPegSupply { supply: Option<u64> },
    /// Record the yield protocol
    SetYieldProtocol { protocol: String },
}

/// A call at a logical time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Logical time
    pub at: u64,
    /// Caller identity
    pub caller: String,
    /// The call
    pub call: ScriptCall,
}

/// Full simulation script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Treasury parameters
    #[serde(default)]
    pub config: TreasuryConfig,
    /// Treasury account identity
    #[serde(default = "default_treasury_label")]
    pub treasury: String,
    /// Owner identity
    pub owner: String,
    /// Governance identity
    pub governance: String,
    /// Emergency identity
    pub emergency: String,
    /// Pegged supply; omitted means no peg reference
    #[serde(default)]
    pub peg_supply: Option<u64>,
    /// Starting reserve balances; each funded account pre-approves the treasury
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
    /// Calls in order
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

fn default_treasury_label() -> String {
    DEFAULT_TREASURY_LABEL.to_string()
}

impl Script {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Position in the script
    pub index: usize,
    /// Logical time
    pub at: u64,
    /// Caller identity as written
    pub caller: String,
    /// Short result description on success
    pub output: Option<String>,
    /// Error code on failure
    pub error_code: Option<u32>,
    /// Error message on failure
    pub error: Option<String>,
}

impl StepOutcome {
    /// Whether the step succeeded
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a simulation produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Per-step outcomes
    pub steps: Vec<StepOutcome>,
    /// Emitted events
    pub events: Vec<EventRecord>,
    /// Ledgers after the last step
    pub final_state: TreasuryState,
    /// Treasury asset balance after the last step
    pub treasury_balance: u64,
}

impl SimulationReport {
    /// Number of failed steps
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.succeeded()).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Replays a script against an in-memory treasury
#[derive(Debug)]
pub struct ScriptRunner {
    treasury: Treasury<InMemoryAsset, FixedSupply>,
    steps: Vec<ScriptStep>,
    stop_on_error: bool,
}

impl ScriptRunner {
    /// Build the treasury and fund accounts
    pub fn new(script: Script) -> Result<Self> {
        let treasury_address = resolve_identity(&script.treasury)?;

        let mut asset = InMemoryAsset::new("RESERVE");
        for (identity, amount) in &script.balances {
            let account = resolve_identity(identity)?;
            asset.mint(&account, *amount)?;
            asset.approve(&account, &treasury_address, u64::MAX)?;
        }

        let mut treasury = Treasury::new(
            treasury_address,
            asset,
            resolve_identity(&script.owner)?,
            resolve_identity(&script.governance)?,
            resolve_identity(&script.emergency)?,
            &script.config,
        )?;
        if let Some(supply) = script.peg_supply {
            treasury = treasury.with_peg(FixedSupply(supply));
        }

        Ok(Self {
            treasury,
            steps: script.steps,
            stop_on_error: false,
        })
    }

    /// Stop at the first failing step
    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Run every step and report; the treasury stays available afterwards
    pub fn run(&mut self) -> Result<SimulationReport> {
        let steps = std::mem::take(&mut self.steps);
        let mut outcomes = Vec::with_capacity(steps.len());

        for (index, step) in steps.into_iter().enumerate() {
            let result = resolve_identity(&step.caller)
                .and_then(|caller| self.apply(&CallContext::new(caller, step.at), &step.call));
            let outcome = match result {
                Ok(output) => StepOutcome {
                    index,
                    at: step.at,
                    caller: step.caller,
                    output: Some(output),
                    error_code: None,
                    error: None,
                },
                Err(e) => {
                    tracing::debug!("Step {} failed: {}", index, e);
                    StepOutcome {
                        index,
                        at: step.at,
                        caller: step.caller,
                        output: None,
                        error_code: Some(e.code()),
                        error: Some(e.to_string()),
                    }
                }
            };

            let failed = !outcome.succeeded();
            outcomes.push(outcome);
            if failed && self.stop_on_error {
                break;
            }
        }

        let treasury_balance = self.treasury.reserve().balance_of(&self.treasury.address());
        let events = self.treasury.events_mut().drain();
        Ok(SimulationReport {
            steps: outcomes,
            events,
            final_state: self.treasury.state().clone(),
            treasury_balance,
        })
    }

    /// Treasury under simulation
    pub fn treasury(&self) -> &Treasury<InMemoryAsset, FixedSupply> {
        &self.treasury
    }

    fn apply(&mut self, ctx: &CallContext, call: &ScriptCall) -> Result<String> {
        let t = &mut self.treasury;
        let done = || "ok".to_string();

        match call {
            ScriptCall::Deposit { amount } => t.deposit(ctx, *amount).map(|_| done()),
            ScriptCall::Allocate { amount } => t.allocate(ctx, *amount).map(|_| done()),
            ScriptCall::Deallocate { amount } => t.deallocate(ctx, *amount).map(|_| done()),
            ScriptCall::RemoveCollateral { amount, recipient, reason } => {
                let recipient = resolve_identity(recipient)?;
                t.remove_collateral(ctx, *amount, recipient, reason)
                    .map(|outcome| format!("{:?}", outcome))
            }
            ScriptCall::EmergencyWithdraw { amount, recipient } => {
                let recipient = resolve_identity(recipient)?;
                t.emergency_withdraw(ctx, *amount, recipient)
                    .map(|outcome| format!("{:?}", outcome))
            }
            ScriptCall::CollectFees { source, amount, kind } => {
                let source = resolve_identity(source)?;
                t.collect_fees(ctx, source, *amount, *kind).map(|_| done())
            }
            ScriptCall::DistributeFees => t.distribute_fees(ctx).map(|_| done()),
            ScriptCall::UpdateFeeStructure { structure } => {
                t.update_fee_structure(ctx, *structure).map(|_| done())
            }
            ScriptCall::DeployStabilityFunds { amount, recipient } => {
                let recipient = resolve_identity(recipient)?;
                t.deploy_stability_funds(ctx, *amount, recipient).map(|_| done())
            }
            ScriptCall::ReplenishStabilityFund { amount } => {
                t.replenish_stability_fund(ctx, *amount).map(|_| done())
            }
            ScriptCall::ActivateEmergencyFund { amount, reason } => {
                t.activate_emergency_fund(ctx, *amount, reason).map(|_| done())
            }
            ScriptCall::SetMaxDeployment { amount } => t.set_max_deployment(ctx, *amount).map(|_| done()),
            ScriptCall::RequestWithdrawal { amount, reason } => {
                t.request_withdrawal(ctx, *amount, reason).map(|id| id.to_hex())
            }
            ScriptCall::ExecuteWithdrawal { requester, amount, reason, requested_at } => {
                let requester = resolve_identity(requester)?;
                let id = withdrawal_fingerprint(&requester, *amount, reason, *requested_at);
                t.execute_withdrawal(ctx, &id).map(|_| done())
            }
            ScriptCall::SetWithdrawalDelay { secs } => t.set_withdrawal_delay(ctx, *secs).map(|_| done()),
            ScriptCall::Pause => t.pause(ctx).map(|_| done()),
            ScriptCall::Unpause => t.unpause(ctx).map(|_| done()),
            ScriptCall::Freeze { deposits_off, withdrawals_off } => {
                t.freeze(ctx, *deposits_off, *withdrawals_off).map(|_| done())
            }
            ScriptCall::ProposeOwner { candidate } => {
                let candidate = resolve_identity(candidate)?;
                t.propose_owner(ctx, candidate).map(|_| done())
            }
            ScriptCall::AcceptOwnership => t.accept_ownership(ctx).map(|_| done()),
            ScriptCall::SetGovernance { governance } => {
                let governance = resolve_identity(governance)?;
                t.set_governance(ctx, governance).map(|_| done())
            }
            ScriptCall::AddOperator { operator } => {
                let operator = resolve_identity(operator)?;
                t.add_operator(ctx, operator).map(|added| added.to_string())
            }
            ScriptCall::RemoveOperator { operator } => {
                let operator = resolve_identity(operator)?;
                t.remove_operator(ctx, &operator).map(|removed| removed.to_string())
            }
            ScriptCall::SetRequiredApprovals { required } => {
                t.set_required_approvals(ctx, *required).map(|_| done())
            }
            ScriptCall::SetEmergency { emergency } => {
                let emergency = resolve_identity(emergency)?;
                t.set_emergency(ctx, emergency).map(|_| done())
            }
            ScriptCall::SetEcosystemPeers { manager, oracle } => {
                let manager = resolve_identity(manager)?;
                let oracle = resolve_identity(oracle)?;
                t.set_ecosystem_peers(ctx, manager, oracle).map(|_| done())
            }
            ScriptCall::SetPegSupply { supply } => {
                t.set_peg_supply(ctx, supply.map(FixedSupply)).map(|_| done())
            }
            ScriptCall::SetYieldProtocol { protocol } => {
                let protocol = resolve_identity(protocol)?;
                t.set_yield_protocol(ctx, protocol).map(|_| done())
            }
        }
    }
}

/// Logical time of the last step, if any
pub fn last_step_time(report: &SimulationReport) -> u64 {
    report.steps.iter().map(|s| s.at).max().unwrap_or(0)
}
