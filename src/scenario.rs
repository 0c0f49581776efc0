//! Scripted operations
//!
//! A scenario file holds operation settings plus, per leg, the odds to
//! enter and optionally the outcome to confirm. Playing it drives an
//! [`Operation`] exactly as an operator would, one leg at a time.

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::OperationConfig;
use crate::ledger::{LedgerEvent, LedgerSink, RecordOutcome};
use crate::portfolio::PortfolioMetrics;
use crate::recovery::{Branch, LegQuote, Operation, OperationState};

/// One scripted leg
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioLeg {
    pub back_odds: Decimal,
    pub hedge_odds: Decimal,
    #[serde(default)]
    pub extraction: Decimal,
    /// Outcome to confirm; playback stops at the first leg without one
    #[serde(default)]
    pub outcome: Option<Branch>,
}

/// Scripted operation
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub operation: OperationConfig,
    #[serde(default)]
    pub legs: Vec<ScenarioLeg>,
}

/// Quote shown for a leg and what was confirmed on it
#[derive(Debug, Clone, Serialize)]
pub struct PlayedLeg {
    pub quote: LegQuote,
    pub confirmed: Option<Branch>,
}

/// Everything a playback produced
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub operation: Operation,
    pub legs: Vec<PlayedLeg>,
    pub events: Vec<LedgerEvent>,
    pub state: OperationState,
    pub metrics: PortfolioMetrics,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse scenario")
    }

    /// Drive a fresh operation through the scripted legs
    ///
    /// Each confirmation's event is handed to `sink`. Scripted legs beyond a
    /// concluded operation are reported as an error.
    pub fn play(&self, sink: &mut dyn LedgerSink) -> anyhow::Result<ScenarioReport> {
        let mut operation = self.operation.build()?;
        let mut played = Vec::with_capacity(self.legs.len());
        let mut events = Vec::new();

        for (index, scripted) in self.legs.iter().enumerate() {
            let position = index as u8 + 1;
            if operation.state().is_concluded() {
                anyhow::bail!(
                    "leg {position} scripted after the operation concluded ({})",
                    operation.state().label()
                );
            }

            operation.update_odds(position, scripted.back_odds, scripted.hedge_odds)?;
            operation.update_extraction(position, scripted.extraction)?;
            let quote = operation.quote().context("no active leg to quote")?;

            played.push(PlayedLeg {
                quote,
                confirmed: scripted.outcome,
            });

            let Some(branch) = scripted.outcome else {
                break;
            };
            let event = operation.confirm(position, branch)?;
            if sink.record(&event)? == RecordOutcome::Duplicate {
                tracing::warn!(key = %event.key, "Ledger already held this event");
            }
            events.push(event);
        }

        let state = operation.state();
        let metrics = operation.metrics();
        Ok(ScenarioReport {
            operation,
            legs: played,
            events,
            state,
            metrics,
        })
    }
}

impl ScenarioReport {
    /// Per-leg table for CLI output
    pub fn format_legs(&self) -> String {
        let currency = self.operation.currency();
        let mut out = String::new();
        out.push_str(&format!(
            "{:<4} {:>8} {:>16} {:>16} {:>16} {:>16} {:>8}\n",
            "LEG", "HEDGE", "TARGET", "STAKE", "LIABILITY", "IF GREEN", "RESULT"
        ));
        for leg in &self.legs {
            let q = &leg.quote;
            let next = if q.simulation.on_adverse.exhausts_chain {
                "exhausted".to_string()
            } else {
                currency.format(q.simulation.on_adverse.next_target)
            };
            out.push_str(&format!(
                "{:<4} {:>8} {:>16} {:>16} {:>16} {:>16} {:>8}\n",
                q.position,
                q.inputs.hedge_odds.to_string(),
                currency.format(q.target),
                currency.format(q.stake.stake),
                currency.format(q.stake.liability),
                next,
                leg.confirmed.map(|b| b.label()).unwrap_or("-"),
            ));
        }
        out
    }
}
