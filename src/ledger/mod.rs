//! Ledger hand-off
//!
//! Every confirmed leg yields exactly one terminal event. Events carry a
//! deterministic key so sinks can drop retried writes.

mod jsonl;
mod memory;

pub use jsonl::JsonLinesLedger;
pub use memory::MemoryLedger;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recovery::Branch;

/// Terminal record of one confirmed leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Idempotency key: `<operation id>:<leg position>`
    pub key: String,
    pub operation_id: Uuid,
    pub leg_position: u8,
    pub branch: Branch,
    pub stake: Decimal,
    pub liability: Decimal,
    pub net_result: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent {
    /// Key shared by every write of the same leg
    pub fn key_for(operation_id: Uuid, leg_position: u8) -> String {
        format!("{operation_id}:{leg_position}")
    }
}

/// Outcome of handing an event to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First write of this key
    Recorded,
    /// Key seen before, event dropped
    Duplicate,
}

/// Consumer of confirmed-leg events
pub trait LedgerSink {
    /// Record an event; must be idempotent on `event.key`
    fn record(&mut self, event: &LedgerEvent) -> anyhow::Result<RecordOutcome>;
}
