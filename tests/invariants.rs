//! Property tests for treasury invariants.
//!
//! Random sequences of calls, from random callers at increasing times, must
//! never break the ledger invariants, whatever mix of them fails.

use proptest::prelude::*;

use reserve_treasury::core::config::TreasuryConfig;
use reserve_treasury::core::fees::{FeeKind, FeeStructure};
use reserve_treasury::core::token::{FungibleAsset, InMemoryAsset};
use reserve_treasury::protocol::{CallContext, Treasury};
use reserve_treasury::utils::crypto::{Address, OperationId};

const ACTORS: [&str; 6] = ["owner", "governance", "emergency", "op1", "alice", "stranger"];

#[derive(Debug, Clone)]
enum Action {
    Deposit(u64),
    Allocate(u64),
    Deallocate(u64),
    Remove(u64),
    CollectFees(u64),
    DistributeFees,
    Deploy(u64),
    Replenish(u64),
    RequestWithdrawal(u64),
    ExecuteLatestWithdrawal,
    UpdateShares(u64, u64),
    Pause,
    Unpause,
    Freeze(bool, bool),
    RefuseTransfers(bool),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    let amount = 0u64..2_000;
    prop_oneof![
        amount.clone().prop_map(Action::Deposit),
        amount.clone().prop_map(Action::Allocate),
        amount.clone().prop_map(Action::Deallocate),
        amount.clone().prop_map(Action::Remove),
        amount.clone().prop_map(Action::CollectFees),
        Just(Action::DistributeFees),
        amount.clone().prop_map(Action::Deploy),
        amount.clone().prop_map(Action::Replenish),
        amount.clone().prop_map(Action::RequestWithdrawal),
        Just(Action::ExecuteLatestWithdrawal),
        (0u64..=10_000, 0u64..=10_000).prop_map(|(a, b)| Action::UpdateShares(a, b)),
        Just(Action::Pause),
        Just(Action::Unpause),
        (any::<bool>(), any::<bool>()).prop_map(|(d, w)| Action::Freeze(d, w)),
        any::<bool>().prop_map(Action::RefuseTransfers),
    ]
}

fn addr(label: &str) -> Address {
    Address::from_label(label)
}

fn new_treasury() -> Treasury<InMemoryAsset, InMemoryAsset> {
    let mut asset = InMemoryAsset::new("RSV");
    for who in ACTORS {
        asset.mint(&addr(who), 1_000_000).unwrap();
        asset.approve(&addr(who), &addr("treasury"), u64::MAX).unwrap();
    }

    let mut peg = InMemoryAsset::new("PEG");
    peg.mint(&addr("holder"), 500).unwrap();

    let mut treasury = Treasury::new(
        addr("treasury"),
        asset,
        addr("owner"),
        addr("governance"),
        addr("emergency"),
        &TreasuryConfig::default()
            .with_withdrawal_delay(3)
            .with_required_approvals(2),
    )
    .unwrap()
    .with_peg(peg);
    treasury.add_operator(&CallContext::new(addr("owner"), 0), addr("op1")).unwrap();
    treasury
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ledger_invariants_hold(
        steps in prop::collection::vec((action_strategy(), 0usize..ACTORS.len(), 0u64..3), 1..60)
    ) {
        let mut treasury = new_treasury();
        let mut now = 1u64;
        let mut latest_withdrawal: Option<OperationId> = None;

        for (action, actor, advance) in steps {
            now += advance;
            let ctx = CallContext::new(addr(ACTORS[actor]), now);

            let _ = match action {
                Action::Deposit(a) => treasury.deposit(&ctx, a).map(|_| ()),
                Action::Allocate(a) => treasury.allocate(&ctx, a),
                Action::Deallocate(a) => treasury.deallocate(&ctx, a),
                Action::Remove(a) => treasury.remove_collateral(&ctx, a, addr("sink"), "prop").map(|_| ()),
                Action::CollectFees(a) => treasury.collect_fees(&ctx, addr("alice"), a, FeeKind::Other),
                Action::DistributeFees => treasury.distribute_fees(&ctx),
                Action::Deploy(a) => treasury.deploy_stability_funds(&ctx, a, addr("market")),
                Action::Replenish(a) => treasury.replenish_stability_fund(&ctx, a),
                Action::RequestWithdrawal(a) => treasury.request_withdrawal(&ctx, a, "prop").map(|id| {
                    latest_withdrawal = Some(id);
                }),
                Action::ExecuteLatestWithdrawal => match latest_withdrawal {
                    Some(id) => treasury.execute_withdrawal(&ctx, &id),
                    None => Ok(()),
                },
                Action::UpdateShares(stability, governance) => {
                    let structure = FeeStructure {
                        stability_share: stability,
                        governance_share: governance,
                        development_share: 10_000u64.saturating_sub(stability + governance),
                        ..FeeStructure::default()
                    };
                    treasury.update_fee_structure(&ctx, structure)
                }
                Action::Pause => treasury.pause(&ctx),
                Action::Unpause => treasury.unpause(&ctx),
                Action::Freeze(d, w) => treasury.freeze(&ctx, d, w),
                Action::RefuseTransfers(refuse) => {
                    treasury.reserve_mut().set_refuse_transfers(refuse);
                    Ok(())
                }
            };

            let state = treasury.collateral_state();
            prop_assert!(treasury.ledger_balanced(), "unbalanced: {:?}", state);

            let fees = &treasury.state().fees;
            prop_assert!(fees.total_fees_distributed <= fees.total_fees_collected);

            let shares = treasury.fee_structure();
            prop_assert_eq!(
                shares.stability_share + shares.governance_share + shares.development_share,
                10_000
            );

            let fund = treasury.stability_fund();
            prop_assert!(fund.deployed_funds <= fund.total_funds + fund.reserve_funds);

            prop_assert!(treasury.reserve().verify_supply_invariant());
            prop_assert!(treasury.reserve().balance_of(&addr("treasury")) >= state.total_reserves);
        }
    }

    #[test]
    fn failed_calls_leave_no_trace(amount in 1u64..10_000, deposit in 0u64..5_000) {
        let mut treasury = new_treasury();
        let ctx = CallContext::new(addr("alice"), 1);
        if deposit > 0 {
            treasury.deposit(&ctx, deposit).unwrap();
        }

        let before = treasury.collateral_state();
        let events = treasury.events().len();
        let owner = CallContext::new(addr("owner"), 2);

        if treasury.allocate(&owner, deposit + amount).is_err() {
            prop_assert_eq!(treasury.collateral_state(), before);
            prop_assert_eq!(treasury.events().len(), events);
        }
    }
}
