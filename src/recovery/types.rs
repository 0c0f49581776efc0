//! Core recovery types

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted odds for either side of a leg
pub const MIN_ODDS: Decimal = dec!(1.01);

/// Commission must stay strictly below this fraction (20%)
pub const MAX_COMMISSION: Decimal = dec!(0.20);

/// Leg count bounds for a `Multi` chain
pub const MIN_MULTI_LEGS: u8 = 2;
pub const MAX_MULTI_LEGS: u8 = 10;

/// Ceiling for operator-entered amounts (initial stake, extraction)
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Decimal places of the currency's minor unit
pub const MONEY_DP: u32 = 2;

/// Round a monetary amount to the minor unit
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject odds below [`MIN_ODDS`]
pub fn validate_odds(field: &'static str, odds: Decimal) -> Result<(), HedgeError> {
    if odds < MIN_ODDS {
        return Err(HedgeError::invalid(
            field,
            format!("must be at least {MIN_ODDS}, got {odds}"),
        ));
    }
    Ok(())
}

/// Commission must lie in `[0, MAX_COMMISSION)`
pub fn validate_commission(rate: Decimal) -> Result<(), HedgeError> {
    if rate < Decimal::ZERO || rate >= MAX_COMMISSION {
        return Err(HedgeError::invalid(
            "commission_rate",
            format!("must be in [0, {MAX_COMMISSION}), got {rate}"),
        ));
    }
    Ok(())
}

pub fn validate_initial_stake(stake: Decimal) -> Result<(), HedgeError> {
    if stake <= Decimal::ZERO {
        return Err(HedgeError::invalid(
            "initial_stake",
            format!("must be positive, got {stake}"),
        ));
    }
    validate_amount("initial_stake", stake)
}

/// Reject amounts above [`MAX_AMOUNT`]
pub fn validate_amount(field: &'static str, amount: Decimal) -> Result<(), HedgeError> {
    if amount > MAX_AMOUNT {
        return Err(HedgeError::invalid(
            field,
            format!("must not exceed {MAX_AMOUNT}, got {amount}"),
        ));
    }
    Ok(())
}

/// Engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HedgeError {
    /// Value rejected at the input boundary; the previous value is kept
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// Edit or confirmation not allowed in the current state
    #[error("illegal mutation: {reason}")]
    IllegalMutation { reason: String },
    /// Leg position outside the chain
    #[error("unknown leg position {0}")]
    UnknownLeg(u8),
}

impl HedgeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        HedgeError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Arithmetic on otherwise valid inputs left the decimal range
    pub(crate) fn out_of_range(field: &'static str) -> Self {
        HedgeError::invalid(field, "result exceeds the representable range")
    }

    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        HedgeError::IllegalMutation {
            reason: reason.into(),
        }
    }
}

/// Shape of the bet chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    /// Two legs
    Pair,
    /// Three legs
    Triple,
    /// Operator-chosen number of legs (2..=10)
    Multi(u8),
}

impl ChainKind {
    /// Number of legs in the chain
    pub fn leg_count(&self) -> u8 {
        match self {
            ChainKind::Pair => 2,
            ChainKind::Triple => 3,
            ChainKind::Multi(n) => *n,
        }
    }

    /// Reject a `Multi` count outside its bounds
    pub fn validate(&self) -> Result<(), HedgeError> {
        if let ChainKind::Multi(n) = self {
            if !(MIN_MULTI_LEGS..=MAX_MULTI_LEGS).contains(n) {
                return Err(HedgeError::invalid(
                    "chain_kind",
                    format!("multi chain needs {MIN_MULTI_LEGS}-{MAX_MULTI_LEGS} legs, got {n}"),
                ));
            }
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChainKind::Pair => "PAIR",
            ChainKind::Triple => "TRIPLE",
            ChainKind::Multi(_) => "MULTI",
        }
    }
}

impl Default for ChainKind {
    fn default() -> Self {
        ChainKind::Triple
    }
}

/// Display currency (no FX conversion)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Brl,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Brl => "R$",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Format an amount with the currency symbol at minor-unit precision
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = round_money(amount);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{} {:.2}", self.symbol(), rounded.abs())
        } else {
            format!("{} {:.2}", self.symbol(), rounded.abs())
        }
    }
}

/// Outcome branch of a leg
///
/// Labels follow the desk's convention: `Green` keeps the chain alive with a
/// larger liability, `Red` recovers the target and ends the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Branch {
    /// Hedge wins, target recovered, chain terminates
    #[serde(alias = "red")]
    Red,
    /// Hedge loses, liability carried into the next leg
    #[serde(alias = "green")]
    Green,
}

impl Branch {
    pub fn label(&self) -> &'static str {
        match self {
            Branch::Red => "RED",
            Branch::Green => "GREEN",
        }
    }

    pub fn is_favorable(&self) -> bool {
        matches!(self, Branch::Red)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Branch {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "favorable" => Ok(Branch::Red),
            "green" | "adverse" => Ok(Branch::Green),
            other => Err(HedgeError::invalid(
                "branch",
                format!("expected red or green, got '{other}'"),
            )),
        }
    }
}
