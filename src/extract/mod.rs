//! Source-format event extractors.
//!
//! Each acquisition system writes event descriptions in its own dialect.
//! The [`EventExtractor`] trait gives them one contract: take one already
//! lowercased line and return a filled [`EventRecord`] (plus its absolute
//! time, when the dialect defines one), or [`ExtractError::Unparseable`].
//!
//! The dialect is chosen from a [`SourceFormat`] tag rather than by call
//! site, so both variants share the mapping and timestamp machinery.
//!
//! - [`twin`]: single-file `allscore` descriptions
//! - [`gamma`]: scored-event lines of the split `log/sco/stg` format, plus
//!   the gain and stage sub-formats of its companion files

pub mod gamma;
pub mod twin;

use std::fmt;

use chrono::NaiveDateTime;

use crate::event::EventRecord;
use crate::mapping::MappingTable;
use crate::timeline::RecordingClock;

pub use gamma::GammaExtractor;
pub use twin::TwinExtractor;

/// Acquisition format family of a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// One interleaved `<id>.allscore.txt` file.
    Twin,
    /// Separate `<id>.log.txt`, `<id>.sco.txt` and `<id>.stg.txt` files.
    Gamma,
}

impl SourceFormat {
    /// The extractor for this format's event lines.
    pub fn extractor(self) -> &'static dyn EventExtractor {
        match self {
            SourceFormat::Twin => &TwinExtractor,
            SourceFormat::Gamma => &GammaExtractor,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Twin => f.write_str("twin"),
            SourceFormat::Gamma => f.write_str("gamma"),
        }
    }
}

/// Per-recording inputs an extractor may need.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub mapping: &'a MappingTable,
    /// Known once the primary log has produced its first valid timestamp.
    pub clock: Option<&'a RecordingClock>,
}

impl<'a> ExtractContext<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self {
            mapping,
            clock: None,
        }
    }

    pub fn with_clock(mut self, clock: &'a RecordingClock) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// A record produced from one line.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedEvent {
    /// Absolute time on the recording timeline, `None` for passthrough
    /// timestamps.
    pub time: Option<NaiveDateTime>,
    pub record: EventRecord,
}

/// Failure to recognize a line. Never fatal on its own; the caller decides
/// whether the surrounding file tolerates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractError {
    Unparseable { line: String, reason: &'static str },
}

impl ExtractError {
    pub(crate) fn unparseable(line: &str, reason: &'static str) -> Self {
        ExtractError::Unparseable {
            line: line.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Unparseable { line, reason } => {
                write!(f, "unparseable line ({reason}): '{line}'")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// One implementation per source dialect.
pub trait EventExtractor: Sync {
    /// The format family this extractor understands.
    fn format(&self) -> SourceFormat;

    /// Parse one lowercased event line.
    fn extract(&self, line: &str, ctx: &ExtractContext<'_>)
        -> Result<ExtractedEvent, ExtractError>;
}
