//! Solve command implementation

use clap::Args;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::recovery::{solve, validate_commission, validate_odds};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Amount the hedge must return if it wins
    #[arg(long)]
    pub target: Decimal,

    /// Hedge (lay) odds
    #[arg(long)]
    pub odds: Decimal,

    /// Commission as a fraction; defaults to the configured rate
    #[arg(long)]
    pub commission: Option<Decimal>,
}

impl SolveArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.target < Decimal::ZERO {
            anyhow::bail!("target must be non-negative, got {}", self.target);
        }
        validate_odds("odds", self.odds)?;
        let commission = self
            .commission
            .unwrap_or(config.operation.commission_rate);
        validate_commission(commission)?;

        let result = solve(self.target, self.odds, commission)?;
        let currency = config.operation.currency;
        tracing::debug!(target = %self.target, odds = %self.odds, %commission, "Solved stake");

        println!("Target:     {}", currency.format(self.target));
        println!("Hedge odds: {}", self.odds);
        println!("Commission: {:.2}%", commission * Decimal::ONE_HUNDRED);
        println!("Stake:      {}", currency.format(result.stake));
        println!("Liability:  {}", currency.format(result.liability));
        Ok(())
    }
}
