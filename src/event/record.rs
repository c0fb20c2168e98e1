//! Uniform event record written for every recognized line.
//!
//! Every recording, regardless of the acquisition system that produced it,
//! is reduced to a sequence of these records and written with the fixed
//! [`OUTPUT_HEADER`](super::OUTPUT_HEADER) columns.

use std::fmt;

use super::constants::{
    DEFAULT_DURATION, DEFAULT_EVENT_KEY, DEFAULT_PARAM, DEFAULT_TIMESTAMP, MISC_PREFIX,
};

/// A single output cell for the duration and parameter columns.
///
/// Source systems report these as numbers in some lines and as free text in
/// others (`<n/a>`, signed percentages), so the raw text is kept whenever no
/// arithmetic was applied to it.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Build a value from a regex capture, `None` when the capture is empty
    /// so that the record default stays in place.
    pub fn from_capture(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(FieldValue::Text(raw.to_string()))
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            // Whole floats keep a trailing ".0" so durations read as seconds.
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the uniform event table.
///
/// # Fields
/// - `timestamp`: Time of day, `HH:MM:SS.ff` (raw passthrough for single-file logs)
/// - `event_key`: Canonical, composite (`gain:*`, `stage:*`) or `misc:*` key, lowercase
/// - `duration`: Seconds, `-1` when not applicable
/// - `param1`..`param3`: Event-specific auxiliary values, `0` when absent
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub timestamp: String,
    pub event_key: String,
    pub duration: FieldValue,
    pub param1: FieldValue,
    pub param2: FieldValue,
    pub param3: FieldValue,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            event_key: DEFAULT_EVENT_KEY.to_string(),
            duration: FieldValue::Int(DEFAULT_DURATION),
            param1: FieldValue::Int(DEFAULT_PARAM),
            param2: FieldValue::Int(DEFAULT_PARAM),
            param3: FieldValue::Int(DEFAULT_PARAM),
        }
    }
}

impl EventRecord {
    /// A default record carrying only a key.
    pub fn keyed(event_key: impl Into<String>) -> Self {
        Self {
            event_key: event_key.into(),
            ..Self::default()
        }
    }

    /// True when the key fell through the mapping table.
    pub fn is_unmapped(&self) -> bool {
        self.event_key.starts_with(MISC_PREFIX)
    }

    /// Overwrite the numbered parameter (1-based) when `value` is present.
    pub fn set_param(&mut self, index: usize, value: Option<FieldValue>) {
        let Some(value) = value else {
            return;
        };
        match index {
            1 => self.param1 = value,
            2 => self.param2 = value,
            3 => self.param3 = value,
            _ => {}
        }
    }

    /// The six cells in output column order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.timestamp.clone(),
            self.event_key.clone(),
            self.duration.to_string(),
            self.param1.to_string(),
            self.param2.to_string(),
            self.param3.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_has_all_fields() {
        let record = EventRecord::default();
        assert_eq!(
            record.cells(),
            ["00:00:00.00", "error", "-1", "0", "0", "0"].map(String::from)
        );
    }

    #[test]
    fn test_float_display() {
        assert_eq!(FieldValue::Float(450.0).to_string(), "450.0");
        assert_eq!(FieldValue::Float(3.0).to_string(), "3.0");
        assert_eq!(FieldValue::Float(12.5).to_string(), "12.5");
        assert_eq!(FieldValue::Text("<n/a>".into()).to_string(), "<n/a>");
    }

    #[test]
    fn test_empty_capture_keeps_default() {
        let mut record = EventRecord::default();
        record.set_param(1, FieldValue::from_capture(""));
        record.set_param(2, FieldValue::from_capture("-3.0"));
        assert_eq!(record.param1, FieldValue::Int(0));
        assert_eq!(record.param2, FieldValue::Text("-3.0".into()));
    }

    #[test]
    fn test_unmapped_detection() {
        assert!(EventRecord::keyed("misc:lights out").is_unmapped());
        assert!(!EventRecord::keyed("lights_off").is_unmapped());
    }
}
