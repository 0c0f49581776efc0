//! Engine metrics through the `metrics` facade
//!
//! Nothing is exported unless the host installs a recorder.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::recovery::Branch;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Sum of hedge stakes over visited legs
    Turnover,
    /// Largest liability so far
    PeakLiability,
}

impl GaugeMetric {
    pub fn name(&self) -> &'static str {
        match self {
            GaugeMetric::Turnover => "hedge_recovery_turnover",
            GaugeMetric::PeakLiability => "hedge_recovery_peak_liability",
        }
    }
}

/// Count a confirmed leg by branch
pub fn record_confirmation(branch: Branch) {
    ::metrics::counter!("hedge_recovery_legs_confirmed_total", "branch" => branch.label())
        .increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    let value = value.to_f64().unwrap_or_default();
    ::metrics::gauge!(metric.name()).set(value);
    tracing::trace!(metric = metric.name(), value, "Setting gauge");
}
