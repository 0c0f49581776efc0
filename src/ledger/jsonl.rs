//! JSON-lines ledger writer

use std::collections::HashSet;
use std::io::Write;

use anyhow::Context;

use super::{LedgerEvent, LedgerSink, RecordOutcome};

/// Appends one JSON object per event to a writer
///
/// Deduplication only covers keys written through this instance.
pub struct JsonLinesLedger<W: Write> {
    writer: W,
    seen: HashSet<String>,
}

impl<W: Write> JsonLinesLedger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            seen: HashSet::new(),
        }
    }

    /// Flush and hand back the writer
    pub fn into_inner(mut self) -> anyhow::Result<W> {
        self.writer.flush().context("Failed to flush ledger")?;
        Ok(self.writer)
    }
}

impl<W: Write> LedgerSink for JsonLinesLedger<W> {
    fn record(&mut self, event: &LedgerEvent) -> anyhow::Result<RecordOutcome> {
        if self.seen.contains(&event.key) {
            return Ok(RecordOutcome::Duplicate);
        }
        let line = serde_json::to_string(event).context("Failed to encode ledger event")?;
        writeln!(self.writer, "{line}").context("Failed to write ledger event")?;
        self.seen.insert(event.key.clone());
        Ok(RecordOutcome::Recorded)
    }
}
