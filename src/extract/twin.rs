//! Extractor for single-file `allscore` event descriptions.
//!
//! Descriptions come in a handful of families:
//!
//! ```text
//! respiratory event - dur: 12.5 sec. - obstructive apnea - desat -3.0 %
//! desaturation - dur: 20.0 sec. - min 88.0 % - drop -4.0 %
//! arousal - spontaneous
//! lm - dur: 1.5 sec. - leg movement
//! ekg events - bradycardia
//! ```
//!
//! Anything outside those families is a plain annotation (`lights out`,
//! `video start`) and is mapped as-is.

use regex::Regex;

use super::{EventExtractor, ExtractContext, ExtractError, ExtractedEvent, SourceFormat};
use crate::event::{
    EventRecord, FieldValue, NOMINAL_DURATION, TWIN_BRIEF_PREFIXES, TWIN_BRIEF_RE,
    TWIN_DESATURATION_RE, TWIN_FAMILY_KEYS, TWIN_RESPIRATORY_RE,
};
use crate::mapping::MappingTable;

/// Separator between the base key and the rest of a family description.
const FIELD_SEPARATOR: &str = " -";

#[derive(Clone, Copy, Debug, Default)]
pub struct TwinExtractor;

impl TwinExtractor {
    /// True when the description belongs to a duration-bearing family and
    /// must go through its pattern.
    pub fn is_family_line(description: &str) -> bool {
        let mut parts = description.split(FIELD_SEPARATOR);
        let base = parts.next().unwrap_or_default();
        parts.next().is_some() && TWIN_FAMILY_KEYS.contains(&base)
    }

    fn family_pattern(description: &str) -> Option<&'static Regex> {
        if description.starts_with("respiratory event") {
            Some(&*TWIN_RESPIRATORY_RE)
        } else if description.starts_with("desat") {
            Some(&*TWIN_DESATURATION_RE)
        } else if TWIN_BRIEF_PREFIXES
            .iter()
            .any(|prefix| description.starts_with(prefix))
        {
            Some(&*TWIN_BRIEF_RE)
        } else {
            None
        }
    }

    /// Apply the family pattern to a description.
    pub fn parse_family(description: &str, mapping: &MappingTable) -> Option<EventRecord> {
        let caps = Self::family_pattern(description)?.captures(description)?;

        // The mapping table keys on the base key and qualifier together,
        // e.g. "respiratory event obstructive apnea".
        let base = caps.name("event_key")?.as_str();
        let qualifier = caps.name("event_type").map_or("", |m| m.as_str());
        let composite = format!("{base} {qualifier}");

        let mut record = EventRecord::keyed(mapping.resolve(composite.trim()));
        record.duration = caps
            .name("duration")
            .and_then(|m| FieldValue::from_capture(m.as_str()))
            .unwrap_or(FieldValue::Float(NOMINAL_DURATION));
        for (index, name) in [(1, "param1"), (2, "param2"), (3, "param3")] {
            record.set_param(
                index,
                caps.name(name).and_then(|m| FieldValue::from_capture(m.as_str())),
            );
        }
        Some(record)
    }
}

impl EventExtractor for TwinExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Twin
    }

    fn extract(
        &self,
        line: &str,
        ctx: &ExtractContext<'_>,
    ) -> Result<ExtractedEvent, ExtractError> {
        let record = if Self::is_family_line(line) {
            Self::parse_family(line, ctx.mapping)
                .ok_or_else(|| ExtractError::unparseable(line, "event family pattern mismatch"))?
        } else {
            EventRecord::keyed(ctx.mapping.resolve(line))
        };

        Ok(ExtractedEvent { time: None, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> MappingTable {
        MappingTable::parse(
            "apnea_obstructive|respiratory event obstructive apnea\n\
             desaturation|desaturation\n\
             arousal_spontaneous|arousal spontaneous\n\
             leg_movement|lm leg movement\n\
             lights_off|lights out\n",
        )
        .unwrap()
    }

    fn extract(line: &str) -> Result<EventRecord, ExtractError> {
        let mapping = mapping();
        let ctx = ExtractContext::new(&mapping);
        TwinExtractor.extract(line, &ctx).map(|e| e.record)
    }

    #[test]
    fn test_respiratory_event() {
        let record =
            extract("respiratory event - dur: 12.5 sec. - obstructive apnea - desat -3.0 %")
                .unwrap();
        assert_eq!(record.event_key, "apnea_obstructive");
        assert_eq!(record.duration, FieldValue::Text("12.5".into()));
        assert_eq!(record.param1, FieldValue::Text("-3.0".into()));
        assert_eq!(record.param2, FieldValue::Int(0));
    }

    #[test]
    fn test_respiratory_event_without_desat_value() {
        let record =
            extract("respiratory event - dur: 15.0 sec. - central apnea - desat <n/a>").unwrap();
        assert_eq!(record.event_key, "misc:respiratory event central apnea");
        assert_eq!(record.param1, FieldValue::Text("<n/a>".into()));
    }

    #[test]
    fn test_desaturation() {
        let record = extract("desaturation - dur: 20.0 sec. - min 88.0 % - drop -4.0 %").unwrap();
        assert_eq!(record.event_key, "desaturation");
        assert_eq!(record.duration.to_string(), "20.0");
        assert_eq!(record.param1.to_string(), "88.0");
        assert_eq!(record.param2.to_string(), "-4.0");
        assert_eq!(record.param3, FieldValue::Int(0));
    }

    #[test]
    fn test_arousal_without_duration_defaults() {
        let record = extract("arousal - spontaneous").unwrap();
        assert_eq!(record.event_key, "arousal_spontaneous");
        assert_eq!(record.duration, FieldValue::Float(3.0));
        assert_eq!(record.duration.to_string(), "3.0");
    }

    #[test]
    fn test_leg_movement_with_duration() {
        let record = extract("lm - dur: 1.5 sec. - leg movement").unwrap();
        assert_eq!(record.event_key, "leg_movement");
        assert_eq!(record.duration.to_string(), "1.5");
    }

    #[test]
    fn test_two_word_base_key() {
        let record = extract("ekg events - bradycardia").unwrap();
        assert_eq!(record.event_key, "misc:ekg events bradycardia");
    }

    #[test]
    fn test_plain_annotation_bypasses_patterns() {
        let record = extract("lights out").unwrap();
        assert_eq!(record.event_key, "lights_off");
        assert_eq!(record.duration, FieldValue::Int(-1));

        // A family word without the separator is an annotation too.
        let record = extract("snore").unwrap();
        assert_eq!(record.event_key, "misc:snore");
    }

    #[test]
    fn test_family_mismatch_is_unparseable() {
        let err = extract("desaturation - something else").unwrap_err();
        assert!(matches!(err, ExtractError::Unparseable { .. }));
    }
}
