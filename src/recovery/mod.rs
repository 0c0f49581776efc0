//! Progressive hedge recovery
//!
//! A chain of sequential legs where each leg's hedge is sized to recover
//! everything lost so far. A winning hedge (`RED`) ends the chain; a losing
//! hedge (`GREEN`) adds its liability to the next leg's target.

mod gate;
mod leg;
mod operation;
mod simulator;
mod solver;
mod types;

pub use gate::ConfigurationGate;
pub use leg::{Leg, LegInputs, LegStatus, Resolution};
pub use operation::{LegQuote, Operation, OperationSettings, OperationState};
pub use simulator::{
    simulate, ContinuationOutcome, Simulation, SimulationContext, TerminalOutcome,
};
pub use solver::{solve, StakeResult};
pub use types::{
    round_money, validate_amount, validate_commission, validate_initial_stake, validate_odds,
    Branch, ChainKind, Currency, HedgeError, MAX_AMOUNT, MAX_COMMISSION, MAX_MULTI_LEGS,
    MIN_MULTI_LEGS, MIN_ODDS,
};
