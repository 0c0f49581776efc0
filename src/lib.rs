//! hedge-recovery: progressive hedge recovery engine for sequential bet chains
//!
//! This library provides:
//! - Hedge stake solving with exchange commission
//! - Two-branch (RED / GREEN) forward simulation of the active leg
//! - Leg and operation state machines with a configuration lock
//! - Portfolio metrics folded over the chain
//! - Idempotent ledger events for confirmed legs
//! - Scripted scenario playback and CLI

pub mod cli;
pub mod config;
pub mod ledger;
pub mod portfolio;
pub mod recovery;
pub mod scenario;
pub mod telemetry;
