use clap::Parser;
use hedge_recovery::cli::{Cli, Commands};
use hedge_recovery::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).unwrap_or_default()
    });

    // Initialize telemetry
    hedge_recovery::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Solve(args) => {
            args.execute(&config)?;
        }
        Commands::Run(args) => {
            tracing::info!("Running scenario");
            args.execute()?;
        }
        Commands::Config => {
            let op = &config.operation;
            println!("Current configuration:");
            println!("  Chain: {}", op.chain_kind().label());
            println!("  Legs: {}", op.chain_kind().leg_count());
            println!("  Currency: {}", op.currency.code());
            println!("  Initial stake: {}", op.currency.format(op.initial_stake));
            println!(
                "  Commission: {}%",
                op.commission_rate * rust_decimal_macros::dec!(100)
            );
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
