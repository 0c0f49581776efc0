//! End-to-end chain properties

use hedge_recovery::ledger::{LedgerSink, MemoryLedger, RecordOutcome};
use hedge_recovery::portfolio::TerminationReason;
use hedge_recovery::recovery::{
    Branch, ChainKind, Currency, HedgeError, LegStatus, Operation, OperationSettings,
    OperationState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn operation(kind: ChainKind, stake: Decimal, commission: Decimal) -> Operation {
    Operation::new(OperationSettings {
        chain_kind: kind,
        currency: Currency::Usd,
        initial_stake: stake,
        commission_rate: commission,
    })
    .unwrap()
}

#[test]
fn test_documented_triple_example() {
    let mut op = operation(ChainKind::Triple, dec!(1000), dec!(0.05));

    op.update_hedge_odds(1, dec!(2.00)).unwrap();
    let leg1 = op.quote().unwrap();
    assert_eq!(leg1.stake.stake, dec!(1052.63));
    assert_eq!(leg1.stake.liability, dec!(1052.63));
    op.confirm(1, Branch::Green).unwrap();

    assert_eq!(op.target_for(2).unwrap(), Some(dec!(2052.63)));
    op.update_hedge_odds(2, dec!(1.80)).unwrap();
    assert_eq!(op.quote().unwrap().stake.stake, dec!(2700.83));
    op.confirm(2, Branch::Red).unwrap();

    let metrics = op.metrics();
    assert_eq!(op.state(), OperationState::ConcludedRecovered);
    assert_eq!(metrics.termination, TerminationReason::Recovered);
    assert_eq!(metrics.final_capital, Some(dec!(1000)));
    assert_eq!(metrics.efficiency, Some(dec!(1)));
}

#[test]
fn test_recovery_guarantee_at_every_position() {
    let odds = [dec!(1.72), dec!(15), dec!(1.91), dec!(101), dec!(2.40), dec!(21)];

    for stop_at in 1..=odds.len() as u8 {
        let mut op = operation(ChainKind::Multi(6), dec!(250.35), dec!(0.045));
        for position in 1..stop_at {
            op.update_hedge_odds(position, odds[position as usize - 1]).unwrap();
            op.confirm(position, Branch::Green).unwrap();
        }
        op.update_hedge_odds(stop_at, odds[stop_at as usize - 1]).unwrap();
        let quote = op.quote().unwrap();

        let recovered = quote.simulation.on_favorable.recovered;
        assert!(
            (recovered - quote.target).abs() <= dec!(0.01),
            "leg {stop_at}: recovered {recovered} vs target {}",
            quote.target
        );

        op.confirm(stop_at, Branch::Red).unwrap();
        let final_capital = op.metrics().final_capital.unwrap();
        assert!(
            (final_capital - dec!(250.35)).abs() <= dec!(0.01),
            "leg {stop_at}: final capital {final_capital}"
        );
    }
}

#[test]
fn test_target_propagates_liability() {
    let mut op = operation(ChainKind::Multi(4), dec!(100), dec!(0.05));
    let mut expected_target = dec!(100);

    for (position, hedge) in [(1u8, dec!(1.95)), (2, dec!(2.30)), (3, dec!(1.62))] {
        op.update_hedge_odds(position, hedge).unwrap();
        let quote = op.quote().unwrap();
        assert_eq!(quote.target, expected_target);
        expected_target = quote.target + quote.stake.liability;
        op.confirm(position, Branch::Green).unwrap();
    }
    assert_eq!(op.target_for(4).unwrap(), Some(expected_target));
}

#[test]
fn test_peak_liability_never_decreases() {
    let mut op = operation(ChainKind::Multi(6), dec!(100), dec!(0.05));
    let hedges = [dec!(3.50), dec!(1.20), dec!(2.00), dec!(1.05), dec!(4.00), dec!(1.50)];
    let mut last_peak = Decimal::ZERO;

    for (index, hedge) in hedges.iter().enumerate() {
        let position = index as u8 + 1;
        op.update_hedge_odds(position, *hedge).unwrap();
        op.confirm(position, Branch::Green).unwrap();

        let peak = op.metrics().peak_liability;
        assert!(peak >= last_peak, "peak fell from {last_peak} to {peak}");
        last_peak = peak;
    }
    assert_eq!(op.state(), OperationState::ConcludedAbandoned);
}

#[test]
fn test_exhausted_chain_is_abandoned_not_recovered() {
    let mut op = operation(ChainKind::Pair, dec!(100), dec!(0.05));
    op.update_odds(1, dec!(1.50), dec!(1.55)).unwrap();
    op.confirm(1, Branch::Green).unwrap();

    op.update_odds(2, dec!(1.40), dec!(1.45)).unwrap();
    let quote = op.quote().unwrap();
    assert!(quote.simulation.on_adverse.exhausts_chain);
    assert_eq!(quote.simulation.on_adverse.next_position, None);

    op.confirm(2, Branch::Green).unwrap();
    assert_eq!(op.state(), OperationState::ConcludedAbandoned);
    assert_eq!(op.metrics().termination, TerminationReason::Abandoned);
    assert_eq!(op.leg(2).unwrap().status(), LegStatus::ResolvedAdverse);
    assert!(op.metrics().final_capital.is_some());
}

#[test]
fn test_frozen_history_survives_later_edits() {
    let mut op = operation(ChainKind::Triple, dec!(500), dec!(0.03));
    op.update_odds(1, dec!(1.85), dec!(1.92)).unwrap();
    op.confirm(1, Branch::Green).unwrap();
    let frozen = op.leg(1).unwrap().resolution().unwrap().clone();

    op.update_odds(2, dec!(2.20), dec!(2.28)).unwrap();
    op.update_extraction(2, dec!(15)).unwrap();
    op.confirm(2, Branch::Green).unwrap();

    let reread = op.leg(1).unwrap().resolution().unwrap();
    assert_eq!(reread, &frozen);
    assert_eq!(reread.rederive().unwrap(), frozen);
}

#[test]
fn test_config_locked_after_first_leg() {
    let mut op = operation(ChainKind::Triple, dec!(1000), dec!(0.05));
    op.confirm(1, Branch::Green).unwrap();

    let rejected = [
        op.set_initial_stake(dec!(2000)),
        op.set_commission_rate(dec!(0.01)),
        op.set_chain_kind(ChainKind::Multi(5)),
        op.set_currency(Currency::Gbp),
    ];
    for result in rejected {
        assert!(matches!(result, Err(HedgeError::IllegalMutation { .. })));
    }
    assert!(!op.can_mutate_config());
}

#[test]
fn test_reset_after_mistaken_confirmation() {
    let mut op = operation(ChainKind::Triple, dec!(1000), dec!(0.05));
    op.confirm(1, Branch::Red).unwrap();
    assert!(op.confirm(1, Branch::Green).is_err());

    op.reset();
    assert_eq!(op.state(), OperationState::Configuring);
    op.confirm(1, Branch::Green).unwrap();
    assert_eq!(op.state(), OperationState::Running);
}

#[test]
fn test_ledger_drops_retried_events() {
    let mut op = operation(ChainKind::Triple, dec!(1000), dec!(0.05));
    let mut ledger = MemoryLedger::new();

    let event = op.confirm(1, Branch::Green).unwrap();
    assert_eq!(ledger.record(&event).unwrap(), RecordOutcome::Recorded);
    assert_eq!(ledger.record(&event).unwrap(), RecordOutcome::Duplicate);

    let event = op.confirm(2, Branch::Red).unwrap();
    assert_eq!(ledger.record(&event).unwrap(), RecordOutcome::Recorded);
    assert_eq!(ledger.len(), 2);
}

#[test]
fn test_operation_snapshot_serializes() {
    let mut op = operation(ChainKind::Pair, dec!(100), dec!(0.05));
    op.confirm(1, Branch::Green).unwrap();

    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(json["legs"][0]["status"], "RESOLVED_ADVERSE");
    assert_eq!(json["legs"][1]["status"], "ACTIVE");
    assert_eq!(json["legs"][0]["resolution"]["branch"], "GREEN");

    let metrics = serde_json::to_value(op.metrics()).unwrap();
    assert_eq!(metrics["termination"], "IN_PROGRESS");
}

#[test]
fn test_huge_accumulated_back_odds_rejected_cleanly() {
    let mut op = operation(ChainKind::Multi(10), dec!(100), dec!(0.05));
    for position in 1..=8 {
        op.update_odds(position, dec!(1000), dec!(2.0)).unwrap();
        op.confirm(position, Branch::Green).unwrap();
    }
    op.update_odds(9, dec!(1000), dec!(2.0)).unwrap();
    let before = op.clone();

    assert!(matches!(
        op.confirm(9, Branch::Green),
        Err(HedgeError::InvalidInput { .. })
    ));
    assert_eq!(op, before);
    assert_eq!(op.state(), OperationState::Running);
    assert_eq!(op.metrics().legs_visited, 9);
}
