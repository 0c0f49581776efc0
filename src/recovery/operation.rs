//! Operation: the whole leg chain and its state machine
//!
//! Stakes, liabilities and branch projections of unresolved legs are never
//! stored. They are recomputed from the current snapshot whenever asked for,
//! so an odds edit can never leave a stale number behind.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gate::ConfigurationGate;
use super::leg::{Leg, LegInputs, LegStatus};
use super::simulator::{simulate, Simulation, SimulationContext};
use super::solver::{solve, StakeResult};
use super::types::{
    validate_commission, validate_initial_stake, validate_odds, Branch, ChainKind, Currency,
    HedgeError,
};
use crate::ledger::LedgerEvent;
use crate::portfolio::{self, PortfolioMetrics};
use crate::telemetry::{self, GaugeMetric};

/// Top-level configuration of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSettings {
    pub chain_kind: ChainKind,
    pub currency: Currency,
    /// Back stake placed at the start of the chain
    pub initial_stake: Decimal,
    /// Exchange commission on hedge winnings, as a fraction
    pub commission_rate: Decimal,
}

impl OperationSettings {
    /// Validate every field
    pub fn validate(&self) -> Result<(), HedgeError> {
        self.chain_kind.validate()?;
        validate_initial_stake(self.initial_stake)?;
        validate_commission(self.commission_rate)?;
        Ok(())
    }
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            chain_kind: ChainKind::Triple,
            currency: Currency::Brl,
            initial_stake: dec!(100),
            commission_rate: dec!(0.05),
        }
    }
}

/// Operation-level state, derived from the legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    /// No leg resolved, configuration editable
    Configuring,
    /// At least one leg resolved and one leg active
    Running,
    /// A hedge won
    ConcludedRecovered,
    /// Last leg resolved adversely
    ConcludedAbandoned,
}

impl OperationState {
    pub fn is_concluded(&self) -> bool {
        matches!(
            self,
            OperationState::ConcludedRecovered | OperationState::ConcludedAbandoned
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationState::Configuring => "CONFIGURING",
            OperationState::Running => "RUNNING",
            OperationState::ConcludedRecovered => "CONCLUDED_RECOVERED",
            OperationState::ConcludedAbandoned => "CONCLUDED_ABANDONED",
        }
    }
}

/// Live figures for the active leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegQuote {
    pub position: u8,
    pub inputs: LegInputs,
    /// Recovery target carried into the leg
    pub target: Decimal,
    /// Target plus desired extraction
    pub stake_target: Decimal,
    pub stake: StakeResult,
    pub simulation: Simulation,
}

/// A progressive hedge chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    id: Uuid,
    settings: OperationSettings,
    defaults: OperationSettings,
    legs: Vec<Leg>,
}

impl Operation {
    /// Create an operation with the settings' default leg layout
    pub fn new(settings: OperationSettings) -> Result<Self, HedgeError> {
        settings.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            settings,
            defaults: settings,
            legs: fresh_legs(settings.chain_kind.leg_count()),
        })
    }

    /// Identifier used to key ledger events
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &OperationSettings {
        &self.settings
    }

    pub fn chain_kind(&self) -> ChainKind {
        self.settings.chain_kind
    }

    pub fn currency(&self) -> Currency {
        self.settings.currency
    }

    pub fn initial_stake(&self) -> Decimal {
        self.settings.initial_stake
    }

    pub fn commission_rate(&self) -> Decimal {
        self.settings.commission_rate
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg(&self, position: u8) -> Result<&Leg, HedgeError> {
        self.legs
            .get(self.index(position)?)
            .ok_or(HedgeError::UnknownLeg(position))
    }

    /// The single editable leg, if the chain is still open
    pub fn active_leg(&self) -> Option<&Leg> {
        self.legs.iter().find(|leg| leg.is_active())
    }

    /// Resolved legs in chain order
    pub fn resolved_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|leg| leg.is_resolved())
    }

    pub fn state(&self) -> OperationState {
        let favorable = self
            .legs
            .iter()
            .any(|leg| leg.status() == LegStatus::ResolvedFavorable);
        if favorable {
            return OperationState::ConcludedRecovered;
        }
        if self.legs.last().is_some_and(Leg::is_resolved) {
            return OperationState::ConcludedAbandoned;
        }
        if self.legs.iter().any(Leg::is_resolved) {
            OperationState::Running
        } else {
            OperationState::Configuring
        }
    }

    pub fn gate(&self) -> ConfigurationGate<'_> {
        ConfigurationGate::new(&self.legs)
    }

    pub fn can_mutate_config(&self) -> bool {
        self.gate().can_mutate_config()
    }

    /// Change the chain shape, keeping inputs of surviving positions
    pub fn set_chain_kind(&mut self, kind: ChainKind) -> Result<(), HedgeError> {
        self.gate().check("chain_kind")?;
        kind.validate()?;
        let count = kind.leg_count();
        self.commit(|op| {
            op.legs.truncate(count as usize);
            for position in (op.legs.len() as u8 + 1)..=count {
                op.legs.push(Leg::new(position, LegStatus::Locked));
            }
            op.settings.chain_kind = kind;
            Ok(())
        })?;
        tracing::debug!(kind = kind.label(), legs = count, "Chain kind changed");
        Ok(())
    }

    pub fn set_currency(&mut self, currency: Currency) -> Result<(), HedgeError> {
        self.gate().check("currency")?;
        self.settings.currency = currency;
        Ok(())
    }

    pub fn set_initial_stake(&mut self, stake: Decimal) -> Result<(), HedgeError> {
        self.gate().check("initial_stake")?;
        validate_initial_stake(stake)?;
        self.commit(|op| {
            op.settings.initial_stake = stake;
            Ok(())
        })?;
        self.log_recompute();
        Ok(())
    }

    pub fn set_commission_rate(&mut self, rate: Decimal) -> Result<(), HedgeError> {
        self.gate().check("commission_rate")?;
        validate_commission(rate)?;
        self.commit(|op| {
            op.settings.commission_rate = rate;
            Ok(())
        })?;
        self.log_recompute();
        Ok(())
    }

    /// Edit both odds of the active leg
    pub fn update_odds(
        &mut self,
        position: u8,
        back_odds: Decimal,
        hedge_odds: Decimal,
    ) -> Result<(), HedgeError> {
        self.edit(position, |inputs| {
            inputs.back_odds = back_odds;
            inputs.hedge_odds = hedge_odds;
        })
    }

    pub fn update_back_odds(&mut self, position: u8, back_odds: Decimal) -> Result<(), HedgeError> {
        validate_odds("back_odds", back_odds)?;
        self.edit(position, |inputs| inputs.back_odds = back_odds)
    }

    pub fn update_hedge_odds(
        &mut self,
        position: u8,
        hedge_odds: Decimal,
    ) -> Result<(), HedgeError> {
        validate_odds("hedge_odds", hedge_odds)?;
        self.edit(position, |inputs| inputs.hedge_odds = hedge_odds)
    }

    /// Edit the desired extraction of the active leg
    pub fn update_extraction(
        &mut self,
        position: u8,
        extraction: Decimal,
    ) -> Result<(), HedgeError> {
        self.edit(position, |inputs| inputs.extraction = extraction)
    }

    fn edit(
        &mut self,
        position: u8,
        apply: impl FnOnce(&mut LegInputs),
    ) -> Result<(), HedgeError> {
        let index = self.index(position)?;
        let mut inputs = *self.legs[index].inputs();
        apply(&mut inputs);
        if let Err(err) = self.commit(|op| op.legs[index].set_inputs(inputs)) {
            tracing::warn!(position, error = %err, "Leg edit rejected");
            return Err(err);
        }
        self.log_recompute();
        Ok(())
    }

    /// Recovery target of a leg: frozen for resolved legs, live for the
    /// active one, unknown while locked
    pub fn target_for(&self, position: u8) -> Result<Option<Decimal>, HedgeError> {
        let leg = self.leg(position)?;
        Ok(match leg.status() {
            LegStatus::Locked => None,
            LegStatus::Active => Some(self.live_target(position)),
            LegStatus::ResolvedFavorable | LegStatus::ResolvedAdverse => {
                leg.resolution().map(|r| r.context.target)
            }
        })
    }

    /// Stake, liability and both branch projections of the active leg
    ///
    /// Every mutation is rejected if it would leave the active leg
    /// unquotable, so this is `None` only when no leg is active.
    pub fn quote(&self) -> Option<LegQuote> {
        self.try_quote().ok().flatten()
    }

    fn try_quote(&self) -> Result<Option<LegQuote>, HedgeError> {
        let Some(leg) = self.active_leg() else {
            return Ok(None);
        };
        let inputs = *leg.inputs();
        let ctx = self.context_for(leg.position())?;
        let stake_target = inputs.stake_target(ctx.target);
        let stake = solve(stake_target, inputs.hedge_odds, ctx.commission)?;
        let simulation = simulate(&inputs, &stake, &ctx)?;
        Ok(Some(LegQuote {
            position: leg.position(),
            inputs,
            target: ctx.target,
            stake_target,
            stake,
            simulation,
        }))
    }

    /// Confirm the realized outcome of the active leg
    ///
    /// One-way: the leg's figures freeze and the returned event is what the
    /// ledger should record. An adverse outcome on the last leg concludes
    /// the operation as abandoned.
    pub fn confirm(&mut self, position: u8, branch: Branch) -> Result<LedgerEvent, HedgeError> {
        let index = self.index(position)?;
        let resolved = self.commit(|op| {
            let ctx = op.context_for(position)?;
            let resolution = op.legs[index].resolve(ctx, branch)?.clone();
            if branch == Branch::Green {
                if let Some(next) = op.legs.get_mut(index + 1) {
                    next.unlock();
                }
            }
            Ok(resolution)
        });
        let resolution = match resolved {
            Ok(resolution) => resolution,
            Err(err) => {
                tracing::warn!(position, %branch, error = %err, "Confirmation rejected");
                return Err(err);
            }
        };

        let state = self.state();
        tracing::info!(
            operation = %self.id,
            position,
            %branch,
            stake = %resolution.stake.stake,
            liability = %resolution.stake.liability,
            net = %resolution.net_result,
            state = state.label(),
            "Leg confirmed"
        );
        if state == OperationState::ConcludedAbandoned {
            tracing::warn!(operation = %self.id, "Chain exhausted without recovery");
        }

        let metrics = self.metrics();
        telemetry::record_confirmation(branch);
        telemetry::set_gauge(GaugeMetric::Turnover, metrics.turnover);
        telemetry::set_gauge(GaugeMetric::PeakLiability, metrics.peak_liability);

        Ok(LedgerEvent {
            key: LedgerEvent::key_for(self.id, position),
            operation_id: self.id,
            leg_position: position,
            branch,
            stake: resolution.stake.stake,
            liability: resolution.stake.liability,
            net_result: resolution.net_result,
            timestamp: Utc::now(),
        })
    }

    /// Discard every leg and restore the creation settings
    pub fn reset(&mut self) {
        tracing::info!(operation = %self.id, state = self.state().label(), "Operation reset");
        self.id = Uuid::new_v4();
        self.settings = self.defaults;
        self.legs = fresh_legs(self.defaults.chain_kind.leg_count());
    }

    /// Portfolio metrics of the current snapshot
    pub fn metrics(&self) -> PortfolioMetrics {
        portfolio::aggregate(self)
    }

    fn index(&self, position: u8) -> Result<usize, HedgeError> {
        if position == 0 || position as usize > self.legs.len() {
            return Err(HedgeError::UnknownLeg(position));
        }
        Ok(position as usize - 1)
    }

    fn live_target(&self, position: u8) -> Decimal {
        if position <= 1 {
            return self.settings.initial_stake;
        }
        self.legs[position as usize - 2]
            .resolution()
            .map(|r| r.carried_target)
            .unwrap_or(self.settings.initial_stake)
    }

    fn context_for(&self, position: u8) -> Result<SimulationContext, HedgeError> {
        let earlier = &self.legs[..(position as usize).saturating_sub(1)];
        let mut prior_back_odds = Decimal::ONE;
        let mut realized_net = Decimal::ZERO;
        for r in earlier.iter().filter_map(Leg::resolution) {
            prior_back_odds = prior_back_odds
                .checked_mul(r.inputs.back_odds)
                .ok_or_else(|| HedgeError::out_of_range("back_odds"))?;
            realized_net += r.net_result;
        }
        Ok(SimulationContext {
            position,
            leg_count: self.legs.len() as u8,
            target: self.live_target(position),
            initial_stake: self.settings.initial_stake,
            commission: self.settings.commission_rate,
            prior_back_odds,
            realized_net,
        })
    }

    /// Apply `change` to a copy and keep it only if the active leg can
    /// still be quoted afterwards
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Self) -> Result<T, HedgeError>,
    ) -> Result<T, HedgeError> {
        let mut next = self.clone();
        let out = change(&mut next)?;
        next.try_quote()?;
        *self = next;
        Ok(out)
    }

    fn log_recompute(&self) {
        if let Some(quote) = self.quote() {
            tracing::debug!(
                position = quote.position,
                target = %quote.target,
                stake = %quote.stake.stake,
                liability = %quote.stake.liability,
                "Active leg recomputed"
            );
        }
    }
}

fn fresh_legs(count: u8) -> Vec<Leg> {
    (1..=count)
        .map(|position| {
            let status = if position == 1 {
                LegStatus::Active
            } else {
                LegStatus::Locked
            };
            Leg::new(position, status)
        })
        .collect()
}
