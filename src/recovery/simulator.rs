//! Two-branch forward simulation of a leg
//!
//! Produces what would happen if the active leg resolved favorably (`RED`)
//! or adversely (`GREEN`). Nothing here mutates the operation; the same
//! function is used to freeze a leg when it is confirmed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::leg::LegInputs;
use super::solver::StakeResult;
use super::types::{round_money, Branch, HedgeError};

/// Chain-level inputs a leg's outcomes depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationContext {
    /// 1-based leg position
    pub position: u8,
    /// Total legs in the chain
    pub leg_count: u8,
    /// Recovery target carried into this leg
    pub target: Decimal,
    /// Operation's initial back stake
    pub initial_stake: Decimal,
    /// Exchange commission on hedge winnings
    pub commission: Decimal,
    /// Product of back odds of all earlier legs
    pub prior_back_odds: Decimal,
    /// Sum of net results of all earlier legs
    pub realized_net: Decimal,
}

impl SimulationContext {
    /// Whether this leg is the last one in the chain
    pub fn is_last(&self) -> bool {
        self.position >= self.leg_count
    }
}

/// Hedge wins: target recovered and the chain stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalOutcome {
    pub branch: Branch,
    /// Hedge winnings net of commission
    pub recovered: Decimal,
    /// Back bet is lost
    pub back_side_pl: Decimal,
    pub hedge_side_pl: Decimal,
    pub net_result: Decimal,
    /// Capital after the operation concludes on this branch
    pub final_capital: Decimal,
}

/// Hedge loses: liability rolls into the next leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationOutcome {
    pub branch: Branch,
    /// Zero while the back bet is still running; settled on the last leg
    pub back_side_pl: Decimal,
    /// Hedge liability paid out
    pub hedge_side_pl: Decimal,
    pub net_result: Decimal,
    /// `target + liability`, the next leg's recovery target
    pub next_target: Decimal,
    /// Leg unlocked by this branch, `None` when the chain is exhausted
    pub next_position: Option<u8>,
    /// No leg left to recover the liability
    pub exhausts_chain: bool,
    /// Capital after the operation concludes, only when the chain is exhausted
    pub final_capital: Option<Decimal>,
}

/// Both forward states of one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    pub on_favorable: TerminalOutcome,
    pub on_adverse: ContinuationOutcome,
}

impl Simulation {
    /// Net leg result for the given branch
    pub fn net_result(&self, branch: Branch) -> Decimal {
        match branch {
            Branch::Red => self.on_favorable.net_result,
            Branch::Green => self.on_adverse.net_result,
        }
    }
}

/// Simulate both outcomes of a leg
///
/// A winning hedge is sized to return the stake target, so `recovered` is
/// that target rounded once, whatever the hedge odds. Fails only when the
/// accumulated back payout of an exhausted chain leaves the decimal range.
pub fn simulate(
    inputs: &LegInputs,
    stake: &StakeResult,
    ctx: &SimulationContext,
) -> Result<Simulation, HedgeError> {
    let recovered = round_money(inputs.stake_target(ctx.target));
    let favorable_back = -ctx.initial_stake;
    let favorable_net = recovered + favorable_back;
    let on_favorable = TerminalOutcome {
        branch: Branch::Red,
        recovered,
        back_side_pl: favorable_back,
        hedge_side_pl: recovered,
        net_result: favorable_net,
        final_capital: ctx.initial_stake + ctx.realized_net + favorable_net,
    };

    let exhausts_chain = ctx.is_last();
    let adverse_back = if exhausts_chain {
        // Every leg went the back bet's way, so it settles as a winner
        ctx.initial_stake
            .checked_mul(ctx.prior_back_odds)
            .and_then(|payout| payout.checked_mul(inputs.back_odds))
            .map(|payout| round_money(payout - ctx.initial_stake))
            .ok_or_else(|| HedgeError::out_of_range("back_odds"))?
    } else {
        Decimal::ZERO
    };
    let adverse_hedge = -stake.liability;
    let adverse_net = adverse_back + adverse_hedge;
    let final_capital = if exhausts_chain {
        let capital = (ctx.initial_stake + ctx.realized_net)
            .checked_add(adverse_net)
            .ok_or_else(|| HedgeError::out_of_range("back_odds"))?;
        Some(capital)
    } else {
        None
    };
    let on_adverse = ContinuationOutcome {
        branch: Branch::Green,
        back_side_pl: adverse_back,
        hedge_side_pl: adverse_hedge,
        net_result: adverse_net,
        next_target: ctx.target + stake.liability,
        next_position: (!exhausts_chain).then_some(ctx.position + 1),
        exhausts_chain,
        final_capital,
    };

    Ok(Simulation {
        on_favorable,
        on_adverse,
    })
}
