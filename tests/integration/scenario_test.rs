//! Scenario playback from files

use std::io::Write;

use hedge_recovery::ledger::{JsonLinesLedger, LedgerEvent, MemoryLedger};
use hedge_recovery::recovery::OperationState;
use hedge_recovery::scenario::Scenario;
use rust_decimal_macros::dec;

#[test]
fn test_bundled_triple_scenario() {
    let scenario = Scenario::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/scenarios/triple_recovery.toml"
    ))
    .unwrap();
    let report = scenario.play(&mut MemoryLedger::new()).unwrap();

    assert_eq!(report.state, OperationState::ConcludedRecovered);
    assert_eq!(report.metrics.final_capital, Some(dec!(1000)));
    assert_eq!(report.metrics.turnover, dec!(1052.63) + dec!(2700.83));
}

#[test]
fn test_bundled_multi_scenario_stays_open() {
    let scenario = Scenario::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/scenarios/multi_pending.toml"
    ))
    .unwrap();
    let report = scenario.play(&mut MemoryLedger::new()).unwrap();

    assert_eq!(report.state, OperationState::Running);
    let pending = report.legs.last().unwrap();
    assert_eq!(pending.quote.position, 3);
    assert_eq!(
        pending.quote.stake_target,
        pending.quote.target + dec!(10)
    );
    assert_eq!(report.metrics.final_capital, None);
}

#[test]
fn test_ledger_file_gets_one_line_per_confirmation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [operation]
        chain_kind = "pair"
        initial_stake = 10

        [[legs]]
        back_odds = 2.0
        hedge_odds = 2.0
        outcome = "green"

        [[legs]]
        back_odds = 2.0
        hedge_odds = 2.0
        outcome = "green"
    "#
    )
    .unwrap();

    let scenario = Scenario::load(file.path()).unwrap();
    let mut ledger = JsonLinesLedger::new(Vec::new());
    let report = scenario.play(&mut ledger).unwrap();
    assert_eq!(report.state, OperationState::ConcludedAbandoned);

    let text = String::from_utf8(ledger.into_inner().unwrap()).unwrap();
    let events: Vec<LedgerEvent> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].leg_position, 1);
    assert_eq!(events[1].leg_position, 2);
    assert_eq!(events[0].operation_id, events[1].operation_id);
}

#[test]
fn test_missing_scenario_file() {
    assert!(Scenario::load("/nonexistent/scenario.toml").is_err());
}
