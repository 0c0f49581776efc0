//! Configuration types for hedge-recovery

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::recovery::{ChainKind, Currency, HedgeError, Operation, OperationSettings};
use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub operation: OperationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Chain shape as written in configuration files
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChainKindName {
    Pair,
    #[default]
    Triple,
    Multi,
}

/// Default operation settings
#[derive(Debug, Clone, Deserialize)]
pub struct OperationConfig {
    /// "pair", "triple" or "multi"
    #[serde(default)]
    pub chain_kind: ChainKindName,

    /// Leg count, only read for "multi"
    #[serde(default = "default_multi_legs")]
    pub legs: u8,

    #[serde(default)]
    pub currency: Currency,

    /// Back stake placed at the start of the chain
    #[serde(default = "default_initial_stake")]
    pub initial_stake: Decimal,

    /// Exchange commission as a fraction (0.05 = 5%)
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
}

fn default_multi_legs() -> u8 {
    4
}
fn default_initial_stake() -> Decimal {
    Decimal::new(100, 0)
}
fn default_commission_rate() -> Decimal {
    Decimal::new(5, 2) // 0.05 = 5%
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            chain_kind: ChainKindName::Triple,
            legs: default_multi_legs(),
            currency: Currency::default(),
            initial_stake: default_initial_stake(),
            commission_rate: default_commission_rate(),
        }
    }
}

impl OperationConfig {
    pub fn chain_kind(&self) -> ChainKind {
        match self.chain_kind {
            ChainKindName::Pair => ChainKind::Pair,
            ChainKindName::Triple => ChainKind::Triple,
            ChainKindName::Multi => ChainKind::Multi(self.legs),
        }
    }

    /// Validated engine settings
    pub fn settings(&self) -> Result<OperationSettings, HedgeError> {
        let settings = OperationSettings {
            chain_kind: self.chain_kind(),
            currency: self.currency,
            initial_stake: self.initial_stake,
            commission_rate: self.commission_rate,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Create a fresh operation from these settings
    pub fn build(&self) -> Result<Operation, HedgeError> {
        Operation::new(self.settings()?)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
