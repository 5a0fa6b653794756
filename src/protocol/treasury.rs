//! Treasury aggregate - core orchestration engine.
//!
//! The treasury owns every ledger, the reserve asset handle and the optional
//! pegged-supply reference. Each public operation follows the same order:
//!
//! 1. Capability check (skipped on permissionless paths)
//! 2. Emergency flag checks
//! 3. Own-ledger mutation
//! 4. External asset transfer, always last
//! 5. Event emission
//!
//! Every operation is all-or-nothing. State, reserve asset and event log are
//! checkpointed before the call and restored on any error. Guarded operations
//! additionally hold the reentrancy lock; quorum-gated ones do not.

use serde::{Deserialize, Serialize};

use crate::core::config::TreasuryConfig;
use crate::core::fees::{FeeAccounting, FeeKind, FeeStructure};
use crate::core::ledger::CollateralState;
use crate::core::roles::{Capability, RoleAuthority};
use crate::core::stability::StabilityFund;
use crate::core::token::{FungibleAsset, InMemoryAsset, SupplySource};
use crate::error::{Error, Result};
use crate::governance::emergency::EmergencyFlags;
use crate::governance::quorum::{payout_fingerprint, removal_fingerprint, ApprovalOutcome, ApprovalQuorum};
use crate::governance::timelock::{WithdrawalRequest, WithdrawalTimelock};
use crate::protocol::events::{EventLog, TreasuryEvent};
use crate::protocol::guard::ReentrancyGuard;
use crate::utils::crypto::{Address, OperationId};
use crate::utils::validation::{validate_address, validate_non_zero, validate_sufficient};

// ═══════════════════════════════════════════════════════════════════════════════
// CALL CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Who is calling, and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Calling identity
    pub caller: Address,
    /// Logical time of the call (seconds)
    pub timestamp: u64,
}

impl CallContext {
    /// Create a call context
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREASURY STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Every ledger the treasury owns; the unit of checkpoint and snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryState {
    /// Role holders
    pub roles: RoleAuthority,
    /// Reserve figures
    pub collateral: CollateralState,
    /// Fee rates and shares
    pub fee_structure: FeeStructure,
    /// Fee totals
    pub fees: FeeAccounting,
    /// Stability fund sub-ledger
    pub stability: StabilityFund,
    /// Withdrawal requests
    pub timelock: WithdrawalTimelock,
    /// Outstanding approvals
    pub quorum: ApprovalQuorum,
    /// Pause and freeze switches
    pub flags: EmergencyFlags,
    /// Yield protocol identity; no operation uses it
    pub yield_protocol: Option<Address>,
    /// Amount placed with the yield protocol; no operation changes it
    pub yield_deployed: u64,
}

impl TreasuryState {
    /// Fresh state for the given roles and configuration
    pub fn new(owner: Address, governance: Address, emergency: Address, config: &TreasuryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            roles: RoleAuthority::new(owner, governance, emergency, config.required_approvals)?,
            collateral: CollateralState::default(),
            fee_structure: config.fee_structure,
            fees: FeeAccounting::default(),
            stability: StabilityFund::new(config.max_deployment),
            timelock: WithdrawalTimelock::new(config.withdrawal_delay_secs),
            quorum: ApprovalQuorum::new(),
            flags: EmergencyFlags::default(),
            yield_protocol: None,
            yield_deployed: 0,
        })
    }

    /// Check the cross-ledger invariants a loaded state must satisfy
    pub fn validate(&self) -> Result<()> {
        if !self.collateral.is_balanced() {
            return Err(Error::InvalidConfiguration(format!(
                "collateral unbalanced: allocated {} + available {} != total {}",
                self.collateral.allocated_collateral,
                self.collateral.available_collateral,
                self.collateral.total_reserves
            )));
        }
        self.fee_structure.validate()?;
        if self.roles.required_approvals() == 0 {
            return Err(Error::InvalidConfiguration("required approvals must be positive".into()));
        }
        if self.fees.total_fees_distributed > self.fees.total_fees_collected {
            return Err(Error::InvalidConfiguration("more fees distributed than collected".into()));
        }
        let fund = &self.stability;
        if fund.deployed_funds as u128 > fund.total_funds as u128 + fund.reserve_funds as u128 {
            return Err(Error::InvalidConfiguration("stability fund over-deployed".into()));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREASURY
// ═══════════════════════════════════════════════════════════════════════════════

/// Reserve treasury backing a pegged liability
#[derive(Debug)]
pub struct Treasury<A, P = InMemoryAsset> {
    /// The treasury's own account in the reserve asset
    address: Address,
    /// Ledgers
    state: TreasuryState,
    /// Reserve asset handle
    reserve: A,
    /// Pegged-supply reference for the backing ratio
    peg: Option<P>,
    /// Lock for guarded operations
    guard: ReentrancyGuard,
    /// Emitted events
    events: EventLog,
}

impl<A, P> Treasury<A, P>
where
    A: FungibleAsset + Clone,
    P: SupplySource,
{
    /// Create a treasury with fresh ledgers
    pub fn new(
        address: Address,
        reserve: A,
        owner: Address,
        governance: Address,
        emergency: Address,
        config: &TreasuryConfig,
    ) -> Result<Self> {
        validate_address(&address, "treasury")?;
        let state = TreasuryState::new(owner, governance, emergency, config)?;
        tracing::info!("Treasury {} created with owner {}", address, owner);
        Self::from_parts(address, state, reserve, None)
    }

    /// Reassemble a treasury from saved state; the state must pass validation
    pub(crate) fn from_parts(address: Address, state: TreasuryState, reserve: A, peg: Option<P>) -> Result<Self> {
        validate_address(&address, "treasury")?;
        state.validate()?;
        Ok(Self {
            address,
            state,
            reserve,
            peg,
            guard: ReentrancyGuard::default(),
            events: EventLog::new(),
        })
    }

    /// Builder-style peg installation
    pub fn with_peg(mut self, peg: P) -> Self {
        self.peg = Some(peg);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXECUTION HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run `f` all-or-nothing
    fn transact<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let state = self.state.clone();
        let reserve = self.reserve.clone();
        let mark = self.events.len();

        let result = f(self);
        if result.is_err() {
            self.state = state;
            self.reserve = reserve;
            self.events.truncate(mark);
        }
        result
    }

    /// Run `f` all-or-nothing under the reentrancy lock
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.guard.enter()?;
        let result = self.transact(f);
        self.guard.exit();
        result
    }

    fn require(&self, ctx: &CallContext, capability: Capability) -> Result<()> {
        self.state.roles.require(&ctx.caller, capability)
    }

    fn emit(&mut self, ctx: &CallContext, event: TreasuryEvent) {
        self.events.push(ctx.timestamp, event);
    }

    fn peg_supply(&self) -> Option<u64> {
        self.peg.as_ref().map(|p| p.total_supply())
    }

    /// Record the caller's approval; run `effect` if it completes the quorum
    fn approve_or_execute(
        &mut self,
        ctx: &CallContext,
        id: OperationId,
        effect: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<ApprovalOutcome> {
        let capabilities = self.state.roles.capabilities(&ctx.caller);
        let approvals = self.state.quorum.record_approval(id, ctx.caller, capabilities)?;
        let required = self.state.roles.required_approvals();
        self.emit(
            ctx,
            TreasuryEvent::ApprovalRecorded {
                id,
                approver: ctx.caller,
                approvals,
                required,
            },
        );

        // Taken before the effect; a failing effect rolls the record back
        if self.state.quorum.take_if_ready(&id, required).is_none() {
            return Ok(ApprovalOutcome::Pending { approvals, required });
        }

        effect(self)?;
        self.emit(ctx, TreasuryEvent::OperationExecuted { id });
        tracing::info!("Operation {} executed with {} approvals", id, approvals);
        Ok(ApprovalOutcome::Executed)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COLLATERAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit reserve; the caller must have approved the treasury as spender
    pub fn deposit(&mut self, ctx: &CallContext, amount: u64) -> Result<()> {
        self.guarded(|t| {
            t.state.flags.ensure_not_paused()?;
            t.state.flags.ensure_deposits_enabled()?;
            validate_non_zero(amount)?;

            t.state.collateral.credit(amount, ctx.timestamp)?;
            let treasury = t.address;
            t.reserve.transfer_from(&treasury, &ctx.caller, &treasury, amount)?;

            t.emit(ctx, TreasuryEvent::Deposited { depositor: ctx.caller, amount });
            tracing::info!("Deposit of {} from {}", amount, ctx.caller);
            Ok(())
        })
    }

    /// Earmark available reserve as backing
    pub fn allocate(&mut self, ctx: &CallContext, amount: u64) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;
            t.state.flags.ensure_not_paused()?;
            t.state.collateral.allocate(amount, ctx.timestamp)?;

            t.emit(ctx, TreasuryEvent::Allocated { amount });
            tracing::info!("Allocated {} collateral", amount);
            Ok(())
        })
    }

    /// Release allocated reserve back to available
    pub fn deallocate(&mut self, ctx: &CallContext, amount: u64) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;
            t.state.collateral.deallocate(amount, ctx.timestamp)?;

            t.emit(ctx, TreasuryEvent::Deallocated { amount });
            tracing::info!("Deallocated {} collateral", amount);
            Ok(())
        })
    }

    /// Quorum-gated removal of available reserve
    ///
    /// Every call records the caller's approval for the fingerprint of
    /// `(amount, recipient, reason, now)`. The call supplying the last
    /// required approval checks the withdrawal flag, available reserve and
    /// backing ratio, then pays `recipient`.
    pub fn remove_collateral(
        &mut self,
        ctx: &CallContext,
        amount: u64,
        recipient: Address,
        reason: &str,
    ) -> Result<ApprovalOutcome> {
        self.transact(|t| {
            validate_address(&recipient, "recipient")?;
            let id = removal_fingerprint(amount, &recipient, reason, ctx.timestamp);

            t.approve_or_execute(ctx, id, |t| {
                t.state.flags.ensure_withdrawals_enabled()?;
                validate_sufficient("available collateral", amount, t.state.collateral.available_collateral)?;
                t.state.collateral.check_removal_ratio(amount, t.peg_supply())?;

                t.state.collateral.debit(amount, ctx.timestamp)?;
                let treasury = t.address;
                t.reserve.transfer(&treasury, &recipient, amount)?;

                t.emit(
                    ctx,
                    TreasuryEvent::CollateralRemoved {
                        recipient,
                        amount,
                        reason: reason.to_string(),
                    },
                );
                tracing::info!("Removed {} collateral to {}: {}", amount, recipient, reason);
                Ok(())
            })
        })
    }

    /// Quorum-gated payout of whatever reserve the treasury account holds
    ///
    /// Checks the asset balance, not the ledger, and leaves ledger figures
    /// untouched.
    pub fn emergency_withdraw(
        &mut self,
        ctx: &CallContext,
        amount: u64,
        recipient: Address,
    ) -> Result<ApprovalOutcome> {
        self.transact(|t| {
            validate_address(&recipient, "recipient")?;
            let id = payout_fingerprint(amount, &recipient, ctx.timestamp);

            t.approve_or_execute(ctx, id, |t| {
                let treasury = t.address;
                let balance = t.reserve.balance_of(&treasury);
                validate_sufficient("treasury balance", amount, balance)?;
                t.reserve.transfer(&treasury, &recipient, amount)?;

                t.emit(ctx, TreasuryEvent::EmergencyPayout { recipient, amount });
                tracing::warn!("Emergency payout of {} to {}", amount, recipient);
                Ok(())
            })
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FEES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pull a fee from `source` (which must have approved the treasury)
    pub fn collect_fees(&mut self, ctx: &CallContext, source: Address, amount: u64, kind: FeeKind) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;
            validate_non_zero(amount)?;

            t.state.fees.record_collection(source, amount)?;
            let treasury = t.address;
            t.reserve.transfer_from(&treasury, &source, &treasury, amount)?;

            t.emit(ctx, TreasuryEvent::FeesCollected { source, amount, kind });
            tracing::info!("Collected {} {} fee from {}", amount, kind, source);
            Ok(())
        })
    }

    /// Split undistributed fees among stability fund, governance and owner
    ///
    /// Each share truncates; the remainder is counted as distributed but
    /// credited to nobody.
    pub fn distribute_fees(&mut self, ctx: &CallContext) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;

            let total = t.state.fees.take_undistributed()?;
            let split = t.state.fee_structure.split(total)?;
            t.state.stability.credit(split.stability)?;

            let treasury = t.address;
            let governance = t.state.roles.governance();
            let owner = t.state.roles.owner();
            t.reserve.transfer(&treasury, &governance, split.governance)?;
            t.reserve.transfer(&treasury, &owner, split.development)?;

            t.emit(
                ctx,
                TreasuryEvent::FeesDistributed {
                    total,
                    stability: split.stability,
                    governance: split.governance,
                    development: split.development,
                },
            );
            tracing::info!(
                "Distributed {} in fees ({} stability, {} governance, {} development)",
                total,
                split.stability,
                split.governance,
                split.development
            );
            Ok(())
        })
    }

    /// Replace the fee structure; shares must sum to 10000
    pub fn update_fee_structure(&mut self, ctx: &CallContext, structure: FeeStructure) -> Result<()> {
        self.transact(|t| {
            t.require(ctx, Capability::GovernanceOrOwner)?;
            structure.validate()?;
            t.state.fee_structure = structure;

            t.emit(ctx, TreasuryEvent::FeeStructureUpdated { structure });
            tracing::info!("Fee structure updated by {}", ctx.caller);
            Ok(())
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STABILITY FUND
    // ═══════════════════════════════════════════════════════════════════════════

    /// Send stability funds to `recipient`
    pub fn deploy_stability_funds(&mut self, ctx: &CallContext, amount: u64, recipient: Address) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;
            t.state.flags.ensure_not_paused()?;
            validate_address(&recipient, "recipient")?;

            t.state.stability.deploy(amount, ctx.timestamp)?;
            let treasury = t.address;
            t.reserve.transfer(&treasury, &recipient, amount)?;

            t.emit(ctx, TreasuryEvent::FundsDeployed { recipient, amount });
            tracing::info!("Deployed {} stability funds to {}", amount, recipient);
            Ok(())
        })
    }

    /// Return deployed funds; anyone may call, over-replenishment grows the fund
    pub fn replenish_stability_fund(&mut self, ctx: &CallContext, amount: u64) -> Result<()> {
        self.guarded(|t| {
            t.state.stability.replenish(amount)?;
            let treasury = t.address;
            t.reserve.transfer_from(&treasury, &ctx.caller, &treasury, amount)?;

            t.emit(ctx, TreasuryEvent::FundsReplenished { from: ctx.caller, amount });
            tracing::info!("Stability fund replenished with {} by {}", amount, ctx.caller);
            Ok(())
        })
    }

    /// Move reserve funds into deployment
    pub fn activate_emergency_fund(&mut self, ctx: &CallContext, amount: u64, reason: &str) -> Result<()> {
        self.guarded(|t| {
            t.require(ctx, Capability::EmergencyOrOwner)?;
            t.state.stability.activate_reserve(amount)?;

            t.emit(
                ctx,
                TreasuryEvent::EmergencyFundActivated {
                    amount,
                    reason: reason.to_string(),
                },
            );
            tracing::warn!("Emergency fund activated for {}: {}", amount, reason);
            Ok(())
        })
    }

    /// Change the per-deployment cap
    pub fn set_max_deployment(&mut self, ctx: &CallContext, amount: u64) -> Result<()> {
        self.require(ctx, Capability::GovernanceOrOwner)?;
        self.state.stability.max_deployment = amount;
        tracing::info!("Max deployment set to {}", amount);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WITHDRAWALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a withdrawal intent; no balance check until execution
    pub fn request_withdrawal(&mut self, ctx: &CallContext, amount: u64, reason: &str) -> Result<OperationId> {
        self.guarded(|t| {
            t.require(ctx, Capability::Authorized)?;
            let id = t.state.timelock.request(ctx.caller, amount, reason, ctx.timestamp)?;

            t.emit(
                ctx,
                TreasuryEvent::WithdrawalRequested {
                    id,
                    requester: ctx.caller,
                    amount,
                    reason: reason.to_string(),
                },
            );
            tracing::info!("Withdrawal {} of {} requested by {}", id, amount, ctx.caller);
            Ok(id)
        })
    }

    /// Pay out a due withdrawal to its requester; anyone may call
    pub fn execute_withdrawal(&mut self, ctx: &CallContext, id: &OperationId) -> Result<()> {
        self.guarded(|t| {
            let request = t.state.timelock.mark_executed(id, ctx.timestamp)?;
            t.state.collateral.debit(request.amount, ctx.timestamp)?;

            let treasury = t.address;
            t.reserve.transfer(&treasury, &request.requester, request.amount)?;

            t.emit(
                ctx,
                TreasuryEvent::WithdrawalExecuted {
                    id: *id,
                    requester: request.requester,
                    amount: request.amount,
                },
            );
            tracing::info!("Withdrawal {} executed: {} to {}", id, request.amount, request.requester);
            Ok(())
        })
    }

    /// Change the withdrawal delay; pending requests use the new value
    pub fn set_withdrawal_delay(&mut self, ctx: &CallContext, secs: u64) -> Result<()> {
        self.require(ctx, Capability::GovernanceOrOwner)?;
        self.state.timelock.set_delay(secs);
        tracing::info!("Withdrawal delay set to {}s", secs);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EMERGENCY CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pause deposits, allocation and deployment
    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.require(ctx, Capability::EmergencyOrOwner)?;
        self.state.flags.paused = true;
        self.emit(ctx, TreasuryEvent::Paused { by: ctx.caller });
        tracing::warn!("Treasury paused by {}", ctx.caller);
        Ok(())
    }

    /// Lift the pause; owner only
    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.state.flags.paused = false;
        self.emit(ctx, TreasuryEvent::Unpaused { by: ctx.caller });
        tracing::info!("Treasury unpaused by {}", ctx.caller);
        Ok(())
    }

    /// Set the deposit and withdrawal freezes
    pub fn freeze(&mut self, ctx: &CallContext, deposits_off: bool, withdrawals_off: bool) -> Result<()> {
        self.require(ctx, Capability::EmergencyOrOwner)?;
        self.state.flags.freeze(deposits_off, withdrawals_off);
        let flags = self.state.flags;
        self.emit(
            ctx,
            TreasuryEvent::Frozen {
                deposits_enabled: flags.deposits_enabled,
                withdrawals_enabled: flags.withdrawals_enabled,
            },
        );
        tracing::warn!(
            "Freeze updated: deposits_enabled={}, withdrawals_enabled={}",
            flags.deposits_enabled,
            flags.withdrawals_enabled
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROLE ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Offer ownership to `candidate`
    pub fn propose_owner(&mut self, ctx: &CallContext, candidate: Address) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.state.roles.propose_owner(candidate)?;
        tracing::info!("Ownership offered to {}", candidate);
        Ok(())
    }

    /// Accept a pending ownership offer
    pub fn accept_ownership(&mut self, ctx: &CallContext) -> Result<()> {
        let previous = self.state.roles.accept_ownership(&ctx.caller)?;
        self.emit(
            ctx,
            TreasuryEvent::OwnershipTransferred {
                previous,
                current: ctx.caller,
            },
        );
        tracing::info!("Ownership transferred from {} to {}", previous, ctx.caller);
        Ok(())
    }

    /// Replace the governance address
    pub fn set_governance(&mut self, ctx: &CallContext, governance: Address) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        let previous = self.state.roles.set_governance(governance)?;
        self.emit(
            ctx,
            TreasuryEvent::GovernanceUpdated {
                previous,
                current: governance,
            },
        );
        tracing::info!("Governance changed from {} to {}", previous, governance);
        Ok(())
    }

    /// Replace the emergency address
    pub fn set_emergency(&mut self, ctx: &CallContext, emergency: Address) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.state.roles.set_emergency(emergency)
    }

    /// Register an operator
    pub fn add_operator(&mut self, ctx: &CallContext, operator: Address) -> Result<bool> {
        self.require(ctx, Capability::Owner)?;
        let added = self.state.roles.add_operator(operator)?;
        if added {
            tracing::info!("Operator {} added", operator);
        }
        Ok(added)
    }

    /// Remove an operator; approvals it already gave stay recorded
    pub fn remove_operator(&mut self, ctx: &CallContext, operator: &Address) -> Result<bool> {
        self.require(ctx, Capability::Owner)?;
        Ok(self.state.roles.remove_operator(operator))
    }

    /// Change the quorum threshold
    pub fn set_required_approvals(&mut self, ctx: &CallContext, required: u32) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.state.roles.set_required_approvals(required)?;
        tracing::info!("Required approvals set to {}", required);
        Ok(())
    }

    /// Wire the manager and oracle peers
    pub fn set_ecosystem_peers(&mut self, ctx: &CallContext, manager: Address, oracle: Address) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.state.roles.set_peers(manager, oracle)
    }

    /// Install or clear the pegged-supply reference
    pub fn set_peg_supply(&mut self, ctx: &CallContext, peg: Option<P>) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        self.peg = peg;
        Ok(())
    }

    /// Record the yield protocol identity
    pub fn set_yield_protocol(&mut self, ctx: &CallContext, protocol: Address) -> Result<()> {
        self.require(ctx, Capability::Owner)?;
        validate_address(&protocol, "yield protocol")?;
        self.state.yield_protocol = Some(protocol);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// The treasury's own account
    pub fn address(&self) -> Address {
        self.address
    }

    /// All ledgers
    pub fn state(&self) -> &TreasuryState {
        &self.state
    }

    /// Reserve asset handle
    pub fn reserve(&self) -> &A {
        &self.reserve
    }

    /// Mutable reserve asset handle, for funding accounts outside the treasury
    pub fn reserve_mut(&mut self) -> &mut A {
        &mut self.reserve
    }

    /// Pegged-supply reference
    pub fn peg(&self) -> Option<&P> {
        self.peg.as_ref()
    }

    /// Mutable pegged-supply reference
    pub fn peg_mut(&mut self) -> Option<&mut P> {
        self.peg.as_mut()
    }

    /// Emitted events
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Mutable event log, for draining
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Reserve figures
    pub fn collateral_state(&self) -> CollateralState {
        self.state.collateral
    }

    /// Whether `allocated + available == total`
    pub fn ledger_balanced(&self) -> bool {
        self.state.collateral.is_balanced()
    }

    /// Reserves per unit of pegged supply, scaled by 1e18
    pub fn backing_ratio(&self) -> u128 {
        self.state.collateral.backing_ratio(self.peg_supply())
    }

    /// Current fee structure
    pub fn fee_structure(&self) -> FeeStructure {
        self.state.fee_structure
    }

    /// Cumulative fees from one source
    pub fn fees_from(&self, source: &Address) -> u64 {
        self.state.fees.fees_from(source)
    }

    /// Stability fund figures
    pub fn stability_fund(&self) -> StabilityFund {
        self.state.stability
    }

    /// Emergency flags
    pub fn flags(&self) -> EmergencyFlags {
        self.state.flags
    }

    /// Role holders
    pub fn roles(&self) -> &RoleAuthority {
        &self.state.roles
    }

    /// Get a withdrawal request
    pub fn withdrawal(&self, id: &OperationId) -> Option<&WithdrawalRequest> {
        self.state.timelock.get(id)
    }

    /// Requests not yet executed
    pub fn pending_withdrawals(&self) -> Vec<(OperationId, &WithdrawalRequest)> {
        self.state.timelock.pending()
    }

    /// Requests executable at `now`
    pub fn ready_withdrawals(&self, now: u64) -> Vec<OperationId> {
        self.state.timelock.ready(now)
    }

    /// Approvals recorded for a fingerprint
    pub fn approval_count(&self, id: &OperationId) -> u32 {
        self.state.quorum.approval_count(id)
    }

    /// Whether `who` approved a fingerprint
    pub fn has_approved(&self, id: &OperationId, who: &Address) -> bool {
        self.state.quorum.has_approved(id, who)
    }

    /// Fingerprints with outstanding approvals
    pub fn pending_operations(&self) -> Vec<OperationId> {
        self.state.quorum.pending_operations()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::FixedSupply;
    use crate::error::Error;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn at(label: &str, timestamp: u64) -> CallContext {
        CallContext::new(addr(label), timestamp)
    }

    fn create_test_treasury() -> Treasury<InMemoryAsset, FixedSupply> {
        let mut asset = InMemoryAsset::new("RSV");
        asset.mint(&addr("alice"), 10_000).unwrap();
        asset.approve(&addr("alice"), &addr("treasury"), u64::MAX).unwrap();

        Treasury::new(
            addr("treasury"),
            asset,
            addr("owner"),
            addr("governance"),
            addr("emergency"),
            &TreasuryConfig::default().with_withdrawal_delay(100),
        )
        .unwrap()
    }

    #[test]
    fn test_from_parts_validates_state() {
        let mut treasury = create_test_treasury();
        treasury.deposit(&at("alice", 1), 100).unwrap();

        let mut state = treasury.state().clone();
        assert!(state.validate().is_ok());
        state.collateral.total_reserves = 10;

        let result = Treasury::<InMemoryAsset, FixedSupply>::from_parts(
            addr("treasury"),
            state,
            treasury.reserve().clone(),
            None,
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_deposit_updates_ledger_and_balance() {
        let mut treasury = create_test_treasury();
        treasury.deposit(&at("alice", 5), 1000).unwrap();

        let state = treasury.collateral_state();
        assert_eq!(state.total_reserves, 1000);
        assert_eq!(state.available_collateral, 1000);
        assert_eq!(state.last_update_time, 5);
        assert_eq!(treasury.reserve().balance_of(&addr("treasury")), 1000);
        assert_eq!(treasury.events().count("Deposited"), 1);
    }

    #[test]
    fn test_deposit_zero_rejected() {
        let mut treasury = create_test_treasury();
        assert_eq!(treasury.deposit(&at("alice", 1), 0), Err(Error::ZeroAmount));
    }

    #[test]
    fn test_reentrant_call_rejected() {
        let mut treasury = create_test_treasury();
        let ctx = at("alice", 1);

        let result = treasury.guarded(|t| t.deposit(&ctx, 10));
        assert_eq!(result, Err(Error::Reentrancy));

        // Lock released and nothing applied
        assert_eq!(treasury.collateral_state().total_reserves, 0);
        assert!(treasury.deposit(&ctx, 10).is_ok());
    }

    #[test]
    fn test_refused_transfer_rolls_back() {
        let mut treasury = create_test_treasury();
        treasury.reserve_mut().set_refuse_transfers(true);

        let err = treasury.deposit(&at("alice", 1), 500).unwrap_err();
        assert!(matches!(err, Error::TransferFailed(_)));
        assert_eq!(treasury.collateral_state(), CollateralState::default());
        assert!(treasury.events().is_empty());
    }

    #[test]
    fn test_quorum_failure_keeps_prior_approvals() {
        let mut treasury = create_test_treasury();
        treasury.add_operator(&at("owner", 0), addr("op1")).unwrap();
        treasury.deposit(&at("alice", 0), 100).unwrap();
        treasury.freeze(&at("emergency", 0), false, true).unwrap();

        let first = treasury.remove_collateral(&at("owner", 10), 50, addr("bob"), "ops").unwrap();
        assert!(!first.executed());

        let err = treasury.remove_collateral(&at("op1", 10), 50, addr("bob"), "ops").unwrap_err();
        assert!(matches!(err, Error::OperationDisabled(_)));

        let id = removal_fingerprint(50, &addr("bob"), "ops", 10);
        assert_eq!(treasury.approval_count(&id), 1);
        assert!(!treasury.has_approved(&id, &addr("op1")));
    }

    #[test]
    fn test_backing_ratio_with_peg() {
        let mut treasury = create_test_treasury().with_peg(FixedSupply(500));
        treasury.deposit(&at("alice", 0), 1000).unwrap();
        assert_eq!(treasury.backing_ratio(), 2 * crate::utils::constants::RATIO_PRECISION);

        treasury.set_peg_supply(&at("owner", 0), None).unwrap();
        assert_eq!(treasury.backing_ratio(), u128::MAX);
    }

    #[test]
    fn test_admin_requires_owner() {
        let mut treasury = create_test_treasury();
        let err = treasury.add_operator(&at("governance", 0), addr("op")).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(treasury.set_yield_protocol(&at("owner", 0), Address::ZERO).is_err());
    }
}
