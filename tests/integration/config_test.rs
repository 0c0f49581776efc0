//! Configuration loading

use std::io::Write;

use hedge_recovery::config::Config;
use hedge_recovery::recovery::{ChainKind, Currency};
use rust_decimal_macros::dec;

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.operation.chain_kind(), ChainKind::Triple);
    assert_eq!(config.operation.currency, Currency::Brl);
    assert!(config.operation.build().is_ok());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [operation]
        chain_kind = "pair"
        currency = "gbp"
        initial_stake = 20
        commission_rate = 0.0
    "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let op = config.operation.build().unwrap();
    assert_eq!(op.legs().len(), 2);
    assert_eq!(op.currency(), Currency::Gbp);
    assert_eq!(op.initial_stake(), dec!(20));
    assert_eq!(op.commission_rate(), dec!(0));
}

#[test]
fn test_load_rejects_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[operation\ninitial_stake = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}
