//! Leg lifecycle and frozen resolutions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::simulator::{simulate, SimulationContext};
use super::solver::{solve, StakeResult};
use super::types::{validate_amount, validate_odds, Branch, HedgeError};

/// Editable inputs of a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegInputs {
    /// Odds of the back bet at the bookmaker
    pub back_odds: Decimal,
    /// Odds of the lay bet on the exchange
    pub hedge_odds: Decimal,
    /// Extra amount to extract on top of the recovery target
    pub extraction: Decimal,
}

impl LegInputs {
    pub fn new(back_odds: Decimal, hedge_odds: Decimal) -> Self {
        Self {
            back_odds,
            hedge_odds,
            extraction: Decimal::ZERO,
        }
    }

    pub fn with_extraction(mut self, extraction: Decimal) -> Self {
        self.extraction = extraction;
        self
    }

    /// Reject odds below the floor and extraction outside `[0, MAX_AMOUNT]`
    pub fn validate(&self) -> Result<(), HedgeError> {
        validate_odds("back_odds", self.back_odds)?;
        validate_odds("hedge_odds", self.hedge_odds)?;
        if self.extraction < Decimal::ZERO {
            return Err(HedgeError::invalid(
                "extraction",
                format!("must be non-negative, got {}", self.extraction),
            ));
        }
        validate_amount("extraction", self.extraction)
    }

    /// Amount the hedge stake is sized to return
    pub fn stake_target(&self, recovery_target: Decimal) -> Decimal {
        recovery_target + self.extraction
    }
}

impl Default for LegInputs {
    fn default() -> Self {
        Self::new(dec!(2.00), dec!(2.00))
    }
}

/// Lifecycle state of a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// A predecessor has not resolved adversely yet
    Locked,
    /// Inputs editable, both branches live
    Active,
    /// Hedge won; terminal
    ResolvedFavorable,
    /// Hedge lost; terminal
    ResolvedAdverse,
}

impl LegStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, LegStatus::ResolvedFavorable | LegStatus::ResolvedAdverse)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LegStatus::Locked => "LOCKED",
            LegStatus::Active => "ACTIVE",
            LegStatus::ResolvedFavorable => "RESOLVED_FAVORABLE",
            LegStatus::ResolvedAdverse => "RESOLVED_ADVERSE",
        }
    }
}

impl From<Branch> for LegStatus {
    fn from(branch: Branch) -> Self {
        match branch {
            Branch::Red => LegStatus::ResolvedFavorable,
            Branch::Green => LegStatus::ResolvedAdverse,
        }
    }
}

/// Frozen record of a confirmed leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Inputs at confirmation time
    pub inputs: LegInputs,
    /// Chain state at confirmation time
    pub context: SimulationContext,
    pub stake: StakeResult,
    pub branch: Branch,
    pub back_side_pl: Decimal,
    pub hedge_side_pl: Decimal,
    pub net_result: Decimal,
    /// Target handed to the next leg, zero when the chain stops here
    pub carried_target: Decimal,
    pub resolved_at: DateTime<Utc>,
}

impl Resolution {
    /// Freeze a leg on the given branch
    pub fn freeze(
        inputs: LegInputs,
        context: SimulationContext,
        branch: Branch,
    ) -> Result<Self, HedgeError> {
        Self::derive(inputs, context, branch, Utc::now())
    }

    /// Recompute every monetary field from the stored snapshot
    ///
    /// A frozen resolution must equal its own re-derivation apart from the
    /// timestamp.
    pub fn rederive(&self) -> Result<Self, HedgeError> {
        Self::derive(self.inputs, self.context, self.branch, self.resolved_at)
    }

    fn derive(
        inputs: LegInputs,
        context: SimulationContext,
        branch: Branch,
        resolved_at: DateTime<Utc>,
    ) -> Result<Self, HedgeError> {
        let stake = solve(
            inputs.stake_target(context.target),
            inputs.hedge_odds,
            context.commission,
        )?;
        let sim = simulate(&inputs, &stake, &context)?;

        let (back_side_pl, hedge_side_pl, net_result, carried_target) = match branch {
            Branch::Red => (
                sim.on_favorable.back_side_pl,
                sim.on_favorable.hedge_side_pl,
                sim.on_favorable.net_result,
                Decimal::ZERO,
            ),
            Branch::Green => {
                let adverse = sim.on_adverse;
                let carried = if adverse.exhausts_chain {
                    Decimal::ZERO
                } else {
                    adverse.next_target
                };
                (
                    adverse.back_side_pl,
                    adverse.hedge_side_pl,
                    adverse.net_result,
                    carried,
                )
            }
        };

        Ok(Self {
            inputs,
            context,
            stake,
            branch,
            back_side_pl,
            hedge_side_pl,
            net_result,
            carried_target,
            resolved_at,
        })
    }
}

/// One step in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    position: u8,
    inputs: LegInputs,
    status: LegStatus,
    resolution: Option<Resolution>,
}

impl Leg {
    pub(crate) fn new(position: u8, status: LegStatus) -> Self {
        Self {
            position,
            inputs: LegInputs::default(),
            status,
            resolution: None,
        }
    }

    /// 1-based position in the chain
    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn inputs(&self) -> &LegInputs {
        &self.inputs
    }

    pub fn status(&self) -> LegStatus {
        self.status
    }

    /// Frozen record, present once resolved
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.status == LegStatus::Active
    }

    pub fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }

    /// Replace inputs on an active leg
    pub(crate) fn set_inputs(&mut self, inputs: LegInputs) -> Result<(), HedgeError> {
        self.ensure_active("edit")?;
        inputs.validate()?;
        self.inputs = inputs;
        Ok(())
    }

    /// Resolve the active leg; one-way
    ///
    /// The leg is left untouched if its figures cannot be frozen.
    pub(crate) fn resolve(
        &mut self,
        context: SimulationContext,
        branch: Branch,
    ) -> Result<&Resolution, HedgeError> {
        self.ensure_active("confirm")?;
        let frozen = Resolution::freeze(self.inputs, context, branch)?;
        self.status = branch.into();
        Ok(&*self.resolution.insert(frozen))
    }

    pub(crate) fn unlock(&mut self) {
        if self.status == LegStatus::Locked {
            self.status = LegStatus::Active;
        }
    }

    fn ensure_active(&self, action: &str) -> Result<(), HedgeError> {
        match self.status {
            LegStatus::Active => Ok(()),
            other => Err(HedgeError::illegal(format!(
                "cannot {action} leg {} while {}",
                self.position,
                other.label()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::types::MAX_AMOUNT;

    fn context() -> SimulationContext {
        SimulationContext {
            position: 1,
            leg_count: 3,
            target: dec!(1000),
            initial_stake: dec!(1000),
            commission: dec!(0.05),
            prior_back_odds: Decimal::ONE,
            realized_net: Decimal::ZERO,
        }
    }

    #[test]
    fn test_inputs_validation() {
        assert!(LegInputs::new(dec!(1.01), dec!(1.01)).validate().is_ok());
        assert!(matches!(
            LegInputs::new(dec!(1.00), dec!(2.0)).validate(),
            Err(HedgeError::InvalidInput { field: "back_odds", .. })
        ));
        assert!(matches!(
            LegInputs::new(dec!(2.0), dec!(0.5)).validate(),
            Err(HedgeError::InvalidInput { field: "hedge_odds", .. })
        ));
        assert!(matches!(
            LegInputs::default().with_extraction(dec!(-1)).validate(),
            Err(HedgeError::InvalidInput { field: "extraction", .. })
        ));
    }

    #[test]
    fn test_stake_target_includes_extraction() {
        let inputs = LegInputs::default().with_extraction(dec!(50));
        assert_eq!(inputs.stake_target(dec!(1000)), dec!(1050));
    }

    #[test]
    fn test_locked_leg_rejects_edit() {
        let mut leg = Leg::new(2, LegStatus::Locked);
        let err = leg.set_inputs(LegInputs::new(dec!(1.5), dec!(1.6))).unwrap_err();
        assert!(matches!(err, HedgeError::IllegalMutation { .. }));
        assert_eq!(leg.inputs(), &LegInputs::default());
    }

    #[test]
    fn test_invalid_edit_keeps_last_value() {
        let mut leg = Leg::new(1, LegStatus::Active);
        leg.set_inputs(LegInputs::new(dec!(1.9), dec!(2.1))).unwrap();
        assert!(leg.set_inputs(LegInputs::new(dec!(1.9), dec!(1.0))).is_err());
        assert_eq!(leg.inputs().hedge_odds, dec!(2.1));
    }

    #[test]
    fn test_resolve_freezes_leg() {
        let mut leg = Leg::new(1, LegStatus::Active);
        let resolution = leg.resolve(context(), Branch::Green).unwrap().clone();

        assert_eq!(leg.status(), LegStatus::ResolvedAdverse);
        assert_eq!(resolution.stake.stake, dec!(1052.63));
        assert_eq!(resolution.carried_target, dec!(2052.63));
        assert_eq!(resolution.net_result, dec!(-1052.63));

        assert!(leg.set_inputs(LegInputs::default()).is_err());
        assert!(leg.resolve(context(), Branch::Red).is_err());
        assert_eq!(leg.resolution(), Some(&resolution));
    }

    #[test]
    fn test_rederive_matches_frozen() {
        let mut leg = Leg::new(1, LegStatus::Active);
        leg.set_inputs(LegInputs::new(dec!(1.7), dec!(2.35)).with_extraction(dec!(25)))
            .unwrap();
        let frozen = leg.resolve(context(), Branch::Red).unwrap();
        assert_eq!(&frozen.rederive().unwrap(), frozen);
    }

    #[test]
    fn test_unlock_only_from_locked() {
        let mut leg = Leg::new(2, LegStatus::Locked);
        leg.unlock();
        assert!(leg.is_active());

        let mut done = Leg::new(1, LegStatus::Active);
        done.resolve(context(), Branch::Red).unwrap();
        done.unlock();
        assert_eq!(done.status(), LegStatus::ResolvedFavorable);
    }

    #[test]
    fn test_extraction_ceiling() {
        let inputs = LegInputs::default().with_extraction(MAX_AMOUNT + dec!(1));
        assert!(matches!(
            inputs.validate(),
            Err(HedgeError::InvalidInput { field: "extraction", .. })
        ));
    }

    #[test]
    fn test_failed_freeze_leaves_leg_active() {
        let mut leg = Leg::new(3, LegStatus::Active);
        leg.set_inputs(LegInputs::new(dec!(1000), dec!(2.0))).unwrap();
        let mut ctx = context();
        ctx.position = 3;
        ctx.prior_back_odds = dec!(1000000000000000000000000000);

        assert!(leg.resolve(ctx, Branch::Green).is_err());
        assert!(leg.is_active());
        assert!(leg.resolution().is_none());
    }
}
