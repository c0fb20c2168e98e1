//! Single-file mode: stream an `allscore` log straight to the output.
//!
//! The allscore file already interleaves every event chronologically, so
//! records are written in input order and the raw timestamp column is passed
//! through untouched.

use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use tracing::{debug, error};

use super::input::LossyLines;
use super::result::{RecordingError, RecordingResult};
use crate::extract::{ExtractContext, SourceFormat};
use crate::mapping::MappingTable;
use crate::output::{CsvEventWriter, EventSink};
use crate::paths::{RecordingPaths, ALLSCORE_SUFFIX};

const TRIM_CHARS: [char; 4] = ['\n', '\r', ' ', '\t'];

/// Normalize `<id>.allscore.txt` into `<id><output suffix>`.
pub fn normalize_twin(paths: &RecordingPaths, mapping: &MappingTable) -> Result<RecordingResult> {
    if !paths.allscore.exists() {
        let mut result = RecordingResult::new(&paths.id, SourceFormat::Twin);
        result.add_error(RecordingError::MissingFile {
            suffix: ALLSCORE_SUFFIX.to_string(),
            path: paths.allscore.display().to_string(),
        });
        return Ok(result);
    }

    let input = File::open(&paths.allscore)
        .with_context(|| format!("Failed to open {}", paths.allscore.display()))?;
    let mut writer = CsvEventWriter::create(&paths.output)?;
    let mut result = normalize_twin_lines(&paths.id, BufReader::new(input), mapping, &mut writer)?;
    result.output_written = true;
    Ok(result)
}

/// Normalize allscore lines from any reader into `sink`.
pub fn normalize_twin_lines<R: BufRead>(
    recording: &str,
    input: R,
    mapping: &MappingTable,
    sink: &mut dyn EventSink,
) -> Result<RecordingResult> {
    let mut result = RecordingResult::new(recording, SourceFormat::Twin);
    let extractor = SourceFormat::Twin.extractor();
    let ctx = ExtractContext::new(mapping);
    let file = format!("{recording}{ALLSCORE_SUFFIX}");

    for (idx, line) in LossyLines::new(input).enumerate() {
        let line = line?.to_lowercase();
        let columns: Vec<&str> = line.trim_matches(TRIM_CHARS).split('\t').collect();
        if columns.len() <= 1 {
            result.skipped_lines += 1;
            continue;
        }

        let description = columns[1];
        let mut record = match extractor.extract(description, &ctx) {
            Ok(event) => event.record,
            Err(err) => {
                error!(recording, line = idx + 1, "Parsing error twin: {err}");
                result.add_error(RecordingError::UnparseableLine {
                    file: file.clone(),
                    line_no: idx + 1,
                    message: err.to_string(),
                });
                continue;
            }
        };
        record.timestamp = columns[0].to_string();

        result.track(&record);
        sink.write_event(&record)?;
    }

    sink.finish()?;
    result.rows_written = sink.rows_written();
    debug!(
        recording,
        rows = result.rows_written,
        skipped = result.skipped_lines,
        "normalized single-file recording"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::InMemorySink;
    use std::io::Cursor;

    const ALLSCORE: &str = "\
22:01:00\tLights Out\n\
22:05:30\tRespiratory Event - Dur: 12.5 sec. - Obstructive Apnea - Desat -3.0 %\n\
\n\
22:06:00\tArousal - Spontaneous\n\
22:07:00\tVideo Start\n\
22:08:00\tVideo Start\n\
22:09:00\tDesaturation - garbled\n\
22:10:00\n";

    fn mapping() -> MappingTable {
        MappingTable::parse(
            "lights_off|lights out\n\
             apnea_obstructive|respiratory event obstructive apnea\n\
             arousal_spontaneous|arousal spontaneous\n",
        )
        .unwrap()
    }

    #[test]
    fn test_lines_written_in_input_order() {
        let mut sink = InMemorySink::new();
        let result =
            normalize_twin_lines("rec", Cursor::new(ALLSCORE), &mapping(), &mut sink).unwrap();

        let rows: Vec<(&str, &str)> = sink
            .records()
            .iter()
            .map(|r| (r.timestamp.as_str(), r.event_key.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("22:01:00", "lights_off"),
                ("22:05:30", "apnea_obstructive"),
                ("22:06:00", "arousal_spontaneous"),
                ("22:07:00", "misc:video start"),
                ("22:08:00", "misc:video start"),
            ]
        );
        assert_eq!(result.rows_written, 5);
        assert_eq!(result.skipped_lines, 2);
    }

    #[test]
    fn test_unparseable_family_line_fails_recording() {
        let mut sink = InMemorySink::new();
        let result =
            normalize_twin_lines("rec", Cursor::new(ALLSCORE), &mapping(), &mut sink).unwrap();
        assert!(!result.is_ok());
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0],
            RecordingError::UnparseableLine { line_no: 7, .. }
        ));
    }

    #[test]
    fn test_unmapped_tracked_per_timestamp() {
        let mut sink = InMemorySink::new();
        let result =
            normalize_twin_lines("rec", Cursor::new(ALLSCORE), &mapping(), &mut sink).unwrap();
        let entries: Vec<String> = result.unmapped.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            entries,
            [
                "rec - 22:07:00 - misc:video start",
                "rec - 22:08:00 - misc:video start"
            ]
        );
    }
}
