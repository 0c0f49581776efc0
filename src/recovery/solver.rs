//! Hedge stake solver
//!
//! Sizes the lay stake so that a winning hedge, net of exchange commission
//! on its winnings, returns exactly the outstanding target.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{round_money, HedgeError};

/// Hedge stake and its liability, rounded to the minor unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeResult {
    /// Lay stake to place on the exchange
    pub stake: Decimal,
    /// Amount lost if the hedge loses
    pub liability: Decimal,
}

/// Solve the hedge stake for a target
///
/// `stake = target / ((hedge_odds - 1) * (1 - commission))` is evaluated at
/// full precision and rounded once on the way out. The liability is taken
/// from the stake as it will be placed: `liability = stake * (hedge_odds - 1)`.
///
/// Fails with [`HedgeError::InvalidInput`] if `target < 0`, `hedge_odds <= 1`,
/// `commission` is outside `[0, 1)` or the result leaves the decimal range.
pub fn solve(
    target: Decimal,
    hedge_odds: Decimal,
    commission: Decimal,
) -> Result<StakeResult, HedgeError> {
    if target < Decimal::ZERO {
        return Err(HedgeError::invalid(
            "target",
            format!("must be non-negative, got {target}"),
        ));
    }
    if hedge_odds <= Decimal::ONE {
        return Err(HedgeError::invalid(
            "hedge_odds",
            format!("must exceed 1, got {hedge_odds}"),
        ));
    }
    if commission < Decimal::ZERO || commission >= Decimal::ONE {
        return Err(HedgeError::invalid(
            "commission_rate",
            format!("must be in [0, 1), got {commission}"),
        ));
    }

    let net_odds = hedge_odds - Decimal::ONE;
    let stake = net_odds
        .checked_mul(Decimal::ONE - commission)
        .and_then(|divisor| target.checked_div(divisor))
        .map(round_money)
        .ok_or_else(|| HedgeError::out_of_range("stake"))?;
    let liability = stake
        .checked_mul(net_odds)
        .map(round_money)
        .ok_or_else(|| HedgeError::out_of_range("liability"))?;

    Ok(StakeResult { stake, liability })
}
