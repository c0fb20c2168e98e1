//! Output abstraction for normalized event records.
//!
//! The normalizer writes through the [`EventSink`] trait and never touches
//! the output format directly. This allows:
//!
//! - Streaming writes for single-file recordings ([`CsvEventWriter`])
//! - Buffering and reordering for multi-file recordings ([`MergeBuffer`])
//! - Inspection in tests ([`InMemorySink`])

mod csv;
mod merge;

pub use csv::{escape_field, CsvEventWriter};
pub use merge::MergeBuffer;

use anyhow::Result;

use crate::event::EventRecord;

/// Destination for normalized records, written in final order.
pub trait EventSink {
    /// Write one record.
    fn write_event(&mut self, record: &EventRecord) -> Result<()>;

    /// Number of records written so far.
    fn rows_written(&self) -> usize;

    /// Flush any buffered data to the output.
    fn finish(&mut self) -> Result<()>;
}

/// A sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Vec<EventRecord>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the collected records.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}

impl EventSink for InMemorySink {
    fn write_event(&mut self, record: &EventRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn rows_written(&self) -> usize {
        self.records.len()
    }

    fn finish(&mut self) -> Result<()> {
        // Nothing to flush for the in-memory sink
        Ok(())
    }
}
