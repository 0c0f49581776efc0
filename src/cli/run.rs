//! Run command implementation

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use super::OutputFormat;
use crate::ledger::{JsonLinesLedger, MemoryLedger};
use crate::scenario::{Scenario, ScenarioReport};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (TOML)
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Append ledger events as JSON lines to this file
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

impl RunArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let scenario = Scenario::load(&self.scenario)?;
        tracing::info!(scenario = ?self.scenario, legs = scenario.legs.len(), "Playing scenario");

        let report = match &self.ledger {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open ledger {}", path.display()))?;
                let mut ledger = JsonLinesLedger::new(file);
                let report = scenario.play(&mut ledger)?;
                ledger.into_inner()?;
                report
            }
            None => scenario.play(&mut MemoryLedger::new())?,
        };

        self.print(&report)
    }

    fn print(&self, report: &ScenarioReport) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
            OutputFormat::Table => {
                print!("{}", report.format_legs());
                if let Some(leg) = report.legs.last().filter(|leg| leg.confirmed.is_none()) {
                    let sim = &leg.quote.simulation;
                    let currency = report.operation.currency();
                    println!();
                    println!("Leg {} pending:", leg.quote.position);
                    println!(
                        "  if RED:   net {} -> final capital {}",
                        currency.format(sim.on_favorable.net_result),
                        currency.format(sim.on_favorable.final_capital)
                    );
                    if sim.on_adverse.exhausts_chain {
                        println!(
                            "  if GREEN: chain exhausted, net {}",
                            currency.format(sim.on_adverse.net_result)
                        );
                    } else {
                        println!(
                            "  if GREEN: next target {}",
                            currency.format(sim.on_adverse.next_target)
                        );
                    }
                }
                print!(
                    "{}",
                    report.metrics.format_table(report.operation.currency())
                );
            }
        }
        Ok(())
    }
}
