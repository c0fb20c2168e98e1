//! Per-recording normalization result types.
//!
//! This module defines the outcome of normalizing one recording:
//! - `RecordingResult` - container for errors, warnings and unmapped events
//! - `RecordingError` - conditions that fail the recording
//! - `RecordingWarning` - conditions that were skipped over

use std::fmt;

use crate::event::EventRecord;
use crate::extract::SourceFormat;
use crate::report::{UnmappedEvent, UnmappedReport};

/// Result of normalizing one recording.
#[derive(Debug)]
pub struct RecordingResult {
    pub recording: String,
    pub format: SourceFormat,
    /// Errors that fail the recording.
    pub errors: Vec<RecordingError>,
    /// Lines that were skipped without failing the recording.
    pub warnings: Vec<RecordingWarning>,
    /// Events whose key fell through the mapping table.
    pub unmapped: UnmappedReport,
    pub rows_written: usize,
    /// Lines ignored as blank, too short or otherwise not carrying an event.
    pub skipped_lines: usize,
    /// Whether an output table was created for this recording.
    pub output_written: bool,
}

impl RecordingResult {
    pub fn new(recording: &str, format: SourceFormat) -> Self {
        Self {
            recording: recording.to_string(),
            format,
            errors: Vec::new(),
            warnings: Vec::new(),
            unmapped: UnmappedReport::new(),
            rows_written: 0,
            skipped_lines: 0,
            output_written: false,
        }
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns true if the recording was normalized without errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: RecordingError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: RecordingWarning) {
        self.warnings.push(warning);
    }

    /// Remember the record if its key is unmapped.
    pub fn track(&mut self, record: &EventRecord) {
        if record.is_unmapped() {
            self.unmapped.insert(UnmappedEvent::new(
                &self.recording,
                &record.timestamp,
                &record.event_key,
            ));
        }
    }
}

/// Recording error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// A required input file does not exist.
    MissingFile { suffix: String, path: String },
    /// A line failed a pattern in a file that must be well formed.
    UnparseableLine {
        file: String,
        line_no: usize,
        message: String,
    },
    /// A stage row whose epoch column is not a number.
    InvalidStageEpoch { line_no: usize, value: String },
    /// The primary log has no line with a usable timestamp.
    NoStartTime { path: String },
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::MissingFile { suffix, path } => {
                write!(f, "{suffix}: file not found: {path}")
            }
            RecordingError::UnparseableLine {
                file,
                line_no,
                message,
            } => {
                write!(f, "{file}:{line_no}: {message}")
            }
            RecordingError::InvalidStageEpoch { line_no, value } => {
                write!(f, "stage line {line_no}: invalid epoch '{value}'")
            }
            RecordingError::NoStartTime { path } => {
                write!(f, "{path}: no valid timestamp to start the recording")
            }
        }
    }
}

/// Recording warning types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingWarning {
    /// A line was skipped because it could not be parsed.
    SkippedLine {
        file: String,
        line_no: usize,
        message: String,
    },
}

impl fmt::Display for RecordingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingWarning::SkippedLine {
                file,
                line_no,
                message,
            } => {
                write!(f, "{file}:{line_no}: skipped: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_display() {
        let error = RecordingError::MissingFile {
            suffix: ".stg.txt".to_string(),
            path: "/data/rec.stg.txt".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            ".stg.txt: file not found: /data/rec.stg.txt"
        );
    }

    #[test]
    fn test_unparseable_line_display() {
        let error = RecordingError::UnparseableLine {
            file: "rec.sco.txt".to_string(),
            line_no: 7,
            message: "scored event pattern mismatch".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            "rec.sco.txt:7: scored event pattern mismatch"
        );
    }

    #[test]
    fn test_skipped_line_display() {
        let warning = RecordingWarning::SkippedLine {
            file: "rec.log.txt".to_string(),
            line_no: 3,
            message: "unresolvable timestamp".to_string(),
        };
        assert_eq!(
            format!("{warning}"),
            "rec.log.txt:3: skipped: unresolvable timestamp"
        );
    }

    #[test]
    fn test_result_methods() {
        let mut result = RecordingResult::new("rec", SourceFormat::Gamma);
        assert!(result.is_ok());
        assert!(!result.has_errors());
        assert!(!result.has_warnings());

        result.track(&EventRecord::keyed("lights_off"));
        result.track(&EventRecord::keyed("misc:video start"));
        result.track(&EventRecord::keyed("misc:video start"));
        assert_eq!(result.unmapped.len(), 1);

        result.add_warning(RecordingWarning::SkippedLine {
            file: "rec.log.txt".to_string(),
            line_no: 1,
            message: "test".to_string(),
        });
        assert!(result.is_ok());
        assert!(result.has_warnings());

        result.add_error(RecordingError::NoStartTime {
            path: "rec.log.txt".to_string(),
        });
        assert!(!result.is_ok());
        assert!(result.has_errors());
    }
}
