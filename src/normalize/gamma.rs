//! Multi-file mode: merge the log, stage and scored-event files of one
//! recording into a single timeline.
//!
//! The log file fixes the recording clock, so it is always read first.
//! Stages and scored events are then placed relative to that clock, and the
//! whole buffer is sorted by elapsed time before anything is written.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, error, warn};

use super::input::{is_epoch_header, skip_header_lines, LossyLines};
use super::result::{RecordingError, RecordingResult, RecordingWarning};
use crate::config::NormalizeConfig;
use crate::event::EventRecord;
use crate::extract::{ExtractContext, GammaExtractor, SourceFormat};
use crate::mapping::MappingTable;
use crate::output::{CsvEventWriter, EventSink, MergeBuffer};
use crate::paths::{RecordingPaths, LOG_SUFFIX, SCORED_SUFFIX, STAGE_SUFFIX};
use crate::timeline::{format_timestamp, resolve_timestamp, HalfDayCorrection, RecordingClock};

const TRIM_CHARS: [char; 4] = ['\n', '\r', ' ', '\t'];

/// Log lines sometimes start with a spurious `--/...` column.
const SPURIOUS_COLUMN_PREFIX: &str = "--/";

/// Scored lines with this many non-tab characters or fewer carry no event.
const MIN_SCORED_LINE_LEN: usize = 5;

/// Whether a reader consumed its whole file or stopped on a fatal line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Complete,
    Aborted,
}

/// Accumulates the records of one split-format recording.
pub struct GammaMerger<'a> {
    recording: &'a str,
    mapping: &'a MappingTable,
    config: &'a NormalizeConfig,
    clock: Option<RecordingClock>,
    buffer: MergeBuffer,
    result: RecordingResult,
}

impl<'a> GammaMerger<'a> {
    pub fn new(recording: &'a str, mapping: &'a MappingTable, config: &'a NormalizeConfig) -> Self {
        Self {
            recording,
            mapping,
            config,
            clock: None,
            buffer: MergeBuffer::new(),
            result: RecordingResult::new(recording, SourceFormat::Gamma),
        }
    }

    fn file_label(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.recording)
    }

    /// Read the three companion files in log, stage, scored order.
    pub fn read_all<L, S, C>(&mut self, log: L, stages: S, scored: C) -> Result<ReadOutcome>
    where
        L: BufRead,
        S: BufRead + Seek,
        C: BufRead + Seek,
    {
        if self.read_log(log)? == ReadOutcome::Aborted {
            return Ok(ReadOutcome::Aborted);
        }
        if self.read_stages(stages)? == ReadOutcome::Aborted {
            return Ok(ReadOutcome::Aborted);
        }
        self.read_scored(scored)
    }

    /// Resolve a log timestamp, fixing the clock on the first valid one.
    fn resolve_log_time(&mut self, raw: &str) -> Option<NaiveDateTime> {
        if let Some(clock) = self.clock {
            return clock.resolve(raw);
        }

        let first = resolve_timestamp(raw, None, HalfDayCorrection::NONE)?;
        let clock = RecordingClock::from_first_reading(first);
        debug!(
            recording = self.recording,
            start = %format_timestamp(clock.start),
            half_day = clock.correction.is_applied(),
            "recording clock fixed"
        );
        self.clock = Some(clock);
        Some(clock.start)
    }

    /// Read the primary log. Aborts when no line carries a usable timestamp.
    pub fn read_log<R: BufRead>(&mut self, input: R) -> Result<ReadOutcome> {
        let file = self.file_label(LOG_SUFFIX);

        for (idx, line) in LossyLines::new(input).enumerate() {
            let line = line?.to_lowercase();
            let line = line.trim_matches(TRIM_CHARS);
            let mut columns: Vec<&str> = line.split('\t').collect();
            if line.len() <= 1 || columns.len() <= 2 {
                self.result.skipped_lines += 1;
                continue;
            }
            if columns[0].starts_with(SPURIOUS_COLUMN_PREFIX) {
                columns.remove(0);
            }

            let Some(time) = self.resolve_log_time(columns[0]) else {
                warn!(
                    recording = self.recording,
                    line = idx + 1,
                    "Skipping log line with unresolvable timestamp: {line}"
                );
                self.result.add_warning(RecordingWarning::SkippedLine {
                    file: file.clone(),
                    line_no: idx + 1,
                    message: format!("unresolvable timestamp '{}'", columns[0]),
                });
                continue;
            };

            let text = columns[1].trim_matches(TRIM_CHARS);
            if text.is_empty() {
                self.result.skipped_lines += 1;
                continue;
            }

            let mut record = match GammaExtractor::parse_annotation(text, self.mapping) {
                Ok(record) => record,
                Err(err) => {
                    error!(
                        recording = self.recording,
                        line = idx + 1,
                        "Parsing error gamma: {err}"
                    );
                    self.result.add_error(RecordingError::UnparseableLine {
                        file: file.clone(),
                        line_no: idx + 1,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            record.timestamp = format_timestamp(time);

            self.result.track(&record);
            self.buffer.push(time, record);
        }

        if self.clock.is_none() {
            error!(recording = self.recording, "No valid timestamp in {file}");
            self.result.add_error(RecordingError::NoStartTime { path: file });
            return Ok(ReadOutcome::Aborted);
        }
        Ok(ReadOutcome::Complete)
    }

    /// Read the stage file, one `stage:<label>` record per epoch row.
    pub fn read_stages<R: BufRead + Seek>(&mut self, mut input: R) -> Result<ReadOutcome> {
        let clock = self
            .clock
            .context("stage file read before the recording clock was fixed")?;
        let file = self.file_label(STAGE_SUFFIX);
        let headers = skip_header_lines(&mut input, is_epoch_header)?;

        for (idx, line) in LossyLines::new(input).enumerate() {
            let line_no = headers + idx + 1;
            let line = line?;
            if line.trim().is_empty() || is_epoch_header(&line) {
                self.result.skipped_lines += 1;
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            let epoch_field = columns[0].trim();
            let epoch = epoch_field.parse::<i64>().ok();
            let Some(time) = epoch.and_then(|epoch| clock.epoch_time(epoch)) else {
                if self.config.is_lenient() {
                    warn!(
                        recording = self.recording,
                        line = line_no,
                        "Skipping stage line with invalid epoch '{epoch_field}'"
                    );
                    self.result.add_warning(RecordingWarning::SkippedLine {
                        file: file.clone(),
                        line_no,
                        message: format!("invalid epoch '{epoch_field}'"),
                    });
                    continue;
                }
                error!(
                    recording = self.recording,
                    line = line_no,
                    "Invalid stage epoch '{epoch_field}'"
                );
                self.result.add_error(RecordingError::InvalidStageEpoch {
                    line_no,
                    value: epoch_field.to_string(),
                });
                return Ok(ReadOutcome::Aborted);
            };

            // Second column is the user-defined stage.
            let code = columns.get(1).copied().unwrap_or_default();
            let mut record = EventRecord::keyed(GammaExtractor::stage_key(code));
            record.timestamp = format_timestamp(time);
            self.buffer.push(time, record);
        }
        Ok(ReadOutcome::Complete)
    }

    /// Read the scored-event file under the configured line policy.
    pub fn read_scored<R: BufRead + Seek>(&mut self, mut input: R) -> Result<ReadOutcome> {
        let clock = self
            .clock
            .context("scored-event file read before the recording clock was fixed")?;
        let file = self.file_label(SCORED_SUFFIX);
        let headers = skip_header_lines(&mut input, is_epoch_header)?;
        let extractor = SourceFormat::Gamma.extractor();
        let ctx = ExtractContext::new(self.mapping).with_clock(&clock);

        for (idx, line) in LossyLines::new(input).enumerate() {
            let line_no = headers + idx + 1;
            let line = line?;
            if line.replace('\t', "").trim().len() <= MIN_SCORED_LINE_LEN {
                self.result.skipped_lines += 1;
                continue;
            }

            match extractor.extract(&line, &ctx) {
                Ok(event) => {
                    let time = event.time.unwrap_or(clock.start);
                    self.result.track(&event.record);
                    self.buffer.push(time, event.record);
                }
                Err(err) if self.config.is_lenient() => {
                    warn!(
                        recording = self.recording,
                        line = line_no,
                        "Skipping scored line: {err}"
                    );
                    self.result.add_warning(RecordingWarning::SkippedLine {
                        file: file.clone(),
                        line_no,
                        message: err.to_string(),
                    });
                }
                Err(err) => {
                    error!(
                        recording = self.recording,
                        line = line_no,
                        "Parsing error gamma: {err}"
                    );
                    self.result.add_error(RecordingError::UnparseableLine {
                        file,
                        line_no,
                        message: err.to_string(),
                    });
                    return Ok(ReadOutcome::Aborted);
                }
            }
        }
        Ok(ReadOutcome::Complete)
    }

    /// Sort the buffered records and write them to `sink`.
    pub fn finish(self, sink: &mut dyn EventSink) -> Result<RecordingResult> {
        let mut result = self.result;
        let clock = self
            .clock
            .context("cannot write a recording without a clock")?;
        result.rows_written = self.buffer.write_sorted(&clock, sink)?;
        Ok(result)
    }

    /// Give up on the recording without writing anything.
    pub fn into_result(self) -> RecordingResult {
        self.result
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Normalize `<id>.log.txt`, `<id>.stg.txt` and `<id>.sco.txt` into
/// `<id><output suffix>`.
///
/// No output is created unless every file is present and read to the end.
pub fn normalize_gamma(
    paths: &RecordingPaths,
    mapping: &MappingTable,
    config: &NormalizeConfig,
) -> Result<RecordingResult> {
    let mut merger = GammaMerger::new(&paths.id, mapping, config);

    let missing = paths.missing_gamma_files();
    if !missing.is_empty() {
        for (suffix, path) in missing {
            warn!(recording = %paths.id, "File {suffix} not found for gamma recording");
            merger.result.add_error(RecordingError::MissingFile {
                suffix: suffix.to_string(),
                path: path.display().to_string(),
            });
        }
        return Ok(merger.into_result());
    }

    let outcome = merger.read_all(open(&paths.log)?, open(&paths.stage)?, open(&paths.scored)?)?;
    if outcome == ReadOutcome::Aborted {
        return Ok(merger.into_result());
    }

    let mut writer = CsvEventWriter::create(&paths.output)?;
    let mut result = merger.finish(&mut writer)?;
    result.output_written = true;
    debug!(
        recording = %paths.id,
        rows = result.rows_written,
        skipped = result.skipped_lines,
        "normalized split recording"
    );
    Ok(result)
}
