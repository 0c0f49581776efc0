//! Integration tests

mod chain_test;
mod config_test;
mod scenario_test;
