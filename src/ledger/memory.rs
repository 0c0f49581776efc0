//! In-memory idempotent ledger

use std::collections::HashSet;

use super::{LedgerEvent, LedgerSink, RecordOutcome};

/// Keeps events in arrival order and ignores repeated keys
#[derive(Debug, Default)]
pub struct MemoryLedger {
    events: Vec<LedgerEvent>,
    seen: HashSet<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl LedgerSink for MemoryLedger {
    fn record(&mut self, event: &LedgerEvent) -> anyhow::Result<RecordOutcome> {
        if !self.seen.insert(event.key.clone()) {
            tracing::debug!(key = %event.key, "Duplicate ledger event dropped");
            return Ok(RecordOutcome::Duplicate);
        }
        self.events.push(event.clone());
        Ok(RecordOutcome::Recorded)
    }
}
