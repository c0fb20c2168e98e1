//! Extractors for the split `log/sco/stg` format.
//!
//! The scored-event file carries one event per line as whitespace-separated
//! columns. Trailing numeric columns are positional, and files disagree on
//! how many of them are present:
//!
//! ```text
//! 12 0 1 0 desaturation 1 22:05:00 88.0 -4.0 12.0    param1 param2 duration
//! 14 0 1 0 obst. apnea 1 22:06:00 -3.0 15.0          param1 duration
//! 20 0 1 0 arousal 1 95.0                            param1, nominal duration
//! ```
//!
//! The log file interleaves free-text annotations with gain changes, and
//! the stage file lists one numeric stage code per epoch.

use super::{EventExtractor, ExtractContext, ExtractError, ExtractedEvent, SourceFormat};
use crate::event::{
    collapse_whitespace, EventRecord, FieldValue, CENTI_SCALE, CENTI_THRESHOLD,
    DESATURATION_CENTI_THRESHOLD, DESATURATION_KEY, GAIN_PREFIX, GAMMA_GAIN_RE, GAMMA_KEY_PREFIX,
    GAMMA_SCORED_RE, NOMINAL_DURATION, NOMINAL_DURATION_KEYS, STAGE_CODES, STAGE_PREFIX,
    UNDEFINED_STAGE,
};
use crate::mapping::MappingTable;
use crate::timeline::{format_timestamp, resolve_timestamp, HalfDayCorrection};

/// Marker that identifies a gain change in a log annotation.
pub const GAIN_MARKER: &str = ": gain";

#[derive(Clone, Copy, Debug, Default)]
pub struct GammaExtractor;

impl GammaExtractor {
    /// Parse `<sensor> (<channel>) : gain: <value>` into a `gain:<sensor>`
    /// record with the value in `param1` and the channel in `param2`.
    pub fn parse_gain(text: &str) -> Option<EventRecord> {
        let collapsed = collapse_whitespace(text);
        let caps = GAMMA_GAIN_RE.captures(&collapsed)?;

        let mut record = EventRecord::keyed(format!("{GAIN_PREFIX}{}", &caps["event_key"]));
        record.set_param(1, FieldValue::from_capture(&caps["param1"]));
        record.set_param(2, FieldValue::from_capture(&caps["param2"]));
        Some(record)
    }

    /// Build the record for a log-file annotation: gain changes get their
    /// own key shape, everything else is mapped as a bare key.
    pub fn parse_annotation(
        text: &str,
        mapping: &MappingTable,
    ) -> Result<EventRecord, ExtractError> {
        if text.contains(GAIN_MARKER) {
            Self::parse_gain(text)
                .ok_or_else(|| ExtractError::unparseable(text, "malformed gain change"))
        } else {
            Ok(EventRecord::keyed(mapping.resolve(text)))
        }
    }

    /// Canonical stage label for a numeric stage code.
    pub fn stage_label(code: &str) -> &'static str {
        let code = code.trim();
        STAGE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map_or(UNDEFINED_STAGE, |(_, label)| label)
    }

    /// `stage:<label>` key for a numeric stage code.
    pub fn stage_key(code: &str) -> String {
        format!("{STAGE_PREFIX}{}", Self::stage_label(code))
    }
}

/// Undo the source unit defect where short durations were written as
/// centiseconds-as-fraction. Desaturations use a wider threshold.
pub fn correct_duration(duration: f64, mapped_key: &str) -> f64 {
    if (mapped_key == DESATURATION_KEY && duration < DESATURATION_CENTI_THRESHOLD)
        || duration < CENTI_THRESHOLD
    {
        duration * CENTI_SCALE
    } else {
        duration
    }
}

impl EventExtractor for GammaExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Gamma
    }

    /// Parse one scored-event line.
    fn extract(
        &self,
        line: &str,
        ctx: &ExtractContext<'_>,
    ) -> Result<ExtractedEvent, ExtractError> {
        let collapsed = collapse_whitespace(&line.to_lowercase());
        let caps = GAMMA_SCORED_RE
            .captures(&collapsed)
            .ok_or_else(|| ExtractError::unparseable(line, "scored event pattern mismatch"))?;

        let mut record = EventRecord::keyed(
            ctx.mapping
                .resolve(&format!("{GAMMA_KEY_PREFIX}{}", &caps["event_key"])),
        );

        let raw_time = format!("{} {}", &caps["timestamp"], &caps["epoch"]);
        let (start, correction) = match ctx.clock {
            Some(clock) => (Some(clock.start), clock.correction),
            None => (None, HalfDayCorrection::NONE),
        };
        let time = resolve_timestamp(&raw_time, start, correction)
            .ok_or_else(|| ExtractError::unparseable(line, "unresolvable timestamp"))?;
        record.timestamp = format_timestamp(time);

        let mut param2 = &caps["param2"];
        let mut duration = &caps["duration"];
        // Partial lines shift the duration into the param2 slot.
        if !param2.is_empty() && duration.is_empty() {
            duration = param2;
            param2 = "";
        }

        record.duration = if duration.is_empty()
            && NOMINAL_DURATION_KEYS
                .iter()
                .any(|key| record.event_key.starts_with(key))
        {
            FieldValue::Float(NOMINAL_DURATION)
        } else {
            let value: f64 = duration
                .parse()
                .map_err(|_| ExtractError::unparseable(line, "invalid duration"))?;
            FieldValue::Float(correct_duration(value, &record.event_key))
        };

        record.set_param(1, FieldValue::from_capture(&caps["param1"]));
        record.set_param(2, FieldValue::from_capture(param2));

        Ok(ExtractedEvent {
            time: Some(time),
            record,
        })
    }
}
