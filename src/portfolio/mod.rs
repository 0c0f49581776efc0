//! Portfolio-level metrics
//!
//! Always a read of the current operation snapshot, never stored.

mod aggregator;

pub use aggregator::{aggregate, PortfolioMetrics, TerminationReason};
