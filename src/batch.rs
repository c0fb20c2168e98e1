//! Batch driver: discover the recordings of a folder and normalize them one
//! after another.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::config::NormalizeConfig;
use crate::mapping::MappingTable;
use crate::normalize::{normalize_recording, RecordingResult};
use crate::paths::{RecordingPaths, DEFAULT_OUTPUT_SUFFIX};
use crate::report::UnmappedReport;

/// Extension of the signal files that define which recordings exist.
pub const SIGNAL_EXTENSION: &str = "edf";

/// Stems of the `*.edf` files in `folder` that have an event log next to
/// them, sorted by name.
pub fn discover_recordings(folder: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder {}", folder.display()))?;

    let mut recordings = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SIGNAL_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if RecordingPaths::new(folder, stem, DEFAULT_OUTPUT_SUFFIX).has_event_log() {
            recordings.push(stem.to_string());
        }
    }
    recordings.sort();
    Ok(recordings)
}

/// Per-recording line of the batch summary.
#[derive(Debug, Serialize)]
pub struct RecordingSummary {
    pub recording: String,
    pub format: String,
    pub rows_written: usize,
    pub skipped_lines: usize,
    pub warnings: usize,
    pub unmapped: usize,
}

impl From<&RecordingResult> for RecordingSummary {
    fn from(result: &RecordingResult) -> Self {
        Self {
            recording: result.recording.clone(),
            format: result.format.to_string(),
            rows_written: result.rows_written,
            skipped_lines: result.skipped_lines,
            warnings: result.warnings.len(),
            unmapped: result.unmapped.len(),
        }
    }
}

/// Machine-readable account of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub recordings_processed: usize,
    pub recordings: Vec<RecordingSummary>,
    /// Distinct unmapped occurrences across every recording.
    pub unmapped_total: usize,
    pub elapsed_seconds: f64,
}

impl BatchSummary {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        Ok(())
    }
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub unmapped: UnmappedReport,
    /// The recording that stopped the batch, if any.
    pub failed: Option<RecordingResult>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.failed.is_none()
    }

    fn record(&mut self, result: RecordingResult) {
        self.summary.recordings.push(RecordingSummary::from(&result));
        self.summary.recordings_processed += 1;
        self.unmapped.merge(result.unmapped);
        self.summary.unmapped_total = self.unmapped.len();
    }
}

/// Remaining time estimated from the mean time of the finished recordings.
pub fn estimate_remaining(elapsed: Duration, finished: usize, total: usize) -> Option<Duration> {
    if finished == 0 {
        return None;
    }
    let per_recording = elapsed.as_secs_f64() / finished as f64;
    let remaining = total.saturating_sub(finished) as f64;
    Some(Duration::from_secs_f64(per_recording * remaining))
}

/// `H:MM:SS` rendering of a duration, rounded down to the second.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Normalize every recording in `folder`, stopping at the first failure.
///
/// Outputs already written before a failure are left in place.
pub fn run_batch(
    folder: &Path,
    mapping: &MappingTable,
    config: &NormalizeConfig,
) -> Result<BatchOutcome> {
    let recordings = discover_recordings(folder)?;
    let total = recordings.len();
    info!("Starting the cleaning of {total} recordings");

    let started = Instant::now();
    let mut outcome = BatchOutcome::default();

    for (idx, recording) in recordings.iter().enumerate() {
        match estimate_remaining(started.elapsed(), idx, total) {
            Some(eta) => info!(
                "Processing {recording} : {}|{total}. ETA : {}",
                idx + 1,
                format_hms(eta)
            ),
            None => info!("Processing {recording} : {}|{total}", idx + 1),
        }

        let paths = RecordingPaths::new(folder, recording, &config.output_suffix);
        let result = normalize_recording(&paths, mapping, config)?;
        if !result.is_ok() {
            for err in &result.errors {
                error!(recording = %recording, "{err}");
            }
            error!("Error in parsing recording {recording}. Exiting.");
            outcome.failed = Some(result);
            break;
        }
        outcome.record(result);
    }

    outcome.summary.elapsed_seconds = started.elapsed().as_secs_f64();
    if outcome.is_ok() {
        info!(
            "Parsing of {total} recordings completed in {}",
            format_hms(started.elapsed())
        );
    }
    Ok(outcome)
}
