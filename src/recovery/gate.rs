//! Configuration lock
//!
//! Chain kind, currency, initial stake and commission feed every frozen
//! resolution, so they only change while no leg has resolved.

use super::leg::Leg;
use super::types::HedgeError;

/// Read-only view answering whether configuration may still change
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationGate<'a> {
    legs: &'a [Leg],
}

impl<'a> ConfigurationGate<'a> {
    pub fn new(legs: &'a [Leg]) -> Self {
        Self { legs }
    }

    /// True iff no leg has reached a resolved state
    pub fn can_mutate_config(&self) -> bool {
        !self.legs.iter().any(Leg::is_resolved)
    }

    /// Refuse a config change once history exists
    pub fn check(&self, field: &'static str) -> Result<(), HedgeError> {
        if self.can_mutate_config() {
            return Ok(());
        }
        tracing::warn!(field, "Configuration change rejected after a leg resolved");
        Err(HedgeError::illegal(format!(
            "{field} is locked once a leg has been confirmed"
        )))
    }
}
