//! Unmapped-event tracking and the batch report file.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// One occurrence of an event key that fell through the mapping table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnmappedEvent {
    pub recording: String,
    pub timestamp: String,
    pub event_key: String,
}

impl UnmappedEvent {
    pub fn new(recording: &str, timestamp: &str, event_key: &str) -> Self {
        Self {
            recording: recording.to_string(),
            timestamp: timestamp.to_string(),
            event_key: event_key.to_string(),
        }
    }
}

// Report order is by event key, so unmapped names group together.
impl Ord for UnmappedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event_key
            .cmp(&other.event_key)
            .then_with(|| self.recording.cmp(&other.recording))
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}

impl PartialOrd for UnmappedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UnmappedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.recording, self.timestamp, self.event_key
        )
    }
}

/// Distinct unmapped occurrences, kept sorted by event key.
#[derive(Clone, Debug, Default)]
pub struct UnmappedReport {
    entries: BTreeSet<UnmappedEvent>,
}

impl UnmappedReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence. Returns false if it was already present.
    pub fn insert(&mut self, event: UnmappedEvent) -> bool {
        self.entries.insert(event)
    }

    /// Merge another report (e.g. one recording's) into this one.
    pub fn merge(&mut self, other: UnmappedReport) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnmappedEvent> {
        self.entries.iter()
    }

    /// Write one `<recording> - <timestamp> - <eventkey>` line per entry.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for entry in &self.entries {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
