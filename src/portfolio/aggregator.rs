//! Portfolio metrics folded over an operation's legs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::recovery::{round_money, Branch, Currency, Operation, OperationState};

/// How the operation ended, if it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    Recovered,
    Abandoned,
    InProgress,
}

impl TerminationReason {
    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::Recovered => "RECOVERED",
            TerminationReason::Abandoned => "ABANDONED",
            TerminationReason::InProgress => "IN_PROGRESS",
        }
    }
}

impl From<OperationState> for TerminationReason {
    fn from(state: OperationState) -> Self {
        match state {
            OperationState::ConcludedRecovered => TerminationReason::Recovered,
            OperationState::ConcludedAbandoned => TerminationReason::Abandoned,
            OperationState::Configuring | OperationState::Running => TerminationReason::InProgress,
        }
    }
}

/// Read-only metrics of an operation snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Resolved legs plus the active one
    pub legs_visited: usize,
    /// Sum of hedge stakes over visited legs
    pub turnover: Decimal,
    /// Largest liability over visited legs
    pub peak_liability: Decimal,
    /// Liabilities paid on adverse resolutions
    pub hedge_losses: Decimal,
    /// Exchange commission charged on winning hedges
    pub commission_paid: Decimal,
    /// Recovery target of the active leg
    pub current_target: Option<Decimal>,
    /// Initial stake plus all net leg results, once concluded
    pub final_capital: Option<Decimal>,
    /// Final capital over initial stake, once concluded
    pub efficiency: Option<Decimal>,
    pub termination: TerminationReason,
}

/// Fold resolved legs (frozen figures) and the active leg (live figures)
pub fn aggregate(operation: &Operation) -> PortfolioMetrics {
    let mut legs_visited = 0;
    let mut turnover = Decimal::ZERO;
    let mut peak_liability = Decimal::ZERO;
    let mut hedge_losses = Decimal::ZERO;
    let mut commission_paid = Decimal::ZERO;
    let mut net_total = Decimal::ZERO;

    for resolution in operation.resolved_legs().filter_map(|leg| leg.resolution()) {
        legs_visited += 1;
        turnover += resolution.stake.stake;
        peak_liability = peak_liability.max(resolution.stake.liability);
        net_total += resolution.net_result;
        match resolution.branch {
            Branch::Green => hedge_losses += resolution.stake.liability,
            Branch::Red => {
                let gross =
                    resolution.stake.stake * (resolution.inputs.hedge_odds - Decimal::ONE);
                commission_paid += round_money(gross * resolution.context.commission);
            }
        }
    }

    let quote = operation.quote();
    if let Some(quote) = &quote {
        legs_visited += 1;
        turnover += quote.stake.stake;
        peak_liability = peak_liability.max(quote.stake.liability);
    }

    let state = operation.state();
    let initial = operation.initial_stake();
    let final_capital = state.is_concluded().then_some(initial + net_total);
    let efficiency = final_capital.map(|capital| capital / initial);

    PortfolioMetrics {
        legs_visited,
        turnover,
        peak_liability,
        hedge_losses,
        commission_paid,
        current_target: quote.map(|q| q.target),
        final_capital,
        efficiency,
        termination: state.into(),
    }
}

impl PortfolioMetrics {
    /// Format as table for CLI output
    pub fn format_table(&self, currency: Currency) -> String {
        let money = |value: Option<Decimal>| {
            value
                .map(|v| currency.format(v))
                .unwrap_or_else(|| "-".to_string())
        };
        let efficiency = self
            .efficiency
            .map(|e| format!("{:.2}%", e * dec!(100)))
            .unwrap_or_else(|| "-".to_string());

        format!(
            r#"
══════════════════════════════════════════════════════
               OPERATION METRICS
══════════════════════════════════════════════════════
Termination:      {}
Legs Visited:     {}
Current Target:   {}

EXPOSURE
───────────────────────────────────────────────────────
Turnover:         {}
Peak Liability:   {}
Hedge Losses:     {}
Commission Paid:  {}

RESULT
───────────────────────────────────────────────────────
Final Capital:    {}
Efficiency:       {}
══════════════════════════════════════════════════════
"#,
            self.termination.label(),
            self.legs_visited,
            money(self.current_target),
            currency.format(self.turnover),
            currency.format(self.peak_liability),
            currency.format(self.hedge_losses),
            currency.format(self.commission_paid),
            money(self.final_capital),
            efficiency,
        )
    }
}
