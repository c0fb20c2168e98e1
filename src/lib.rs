//! psgnorm library - normalization of polysomnography event logs.
//!
//! Sleep studies scored on different acquisition systems write their event
//! annotations in incompatible dialects. This library reads them and writes
//! one uniform six-column table per recording, mapping every event name onto
//! a canonical vocabulary and collecting the names it could not map.
//!
//! # Modules
//!
//! - [`mapping`] - Alias table from raw event names to canonical keys
//! - [`timeline`] - Wall-clock and epoch timestamp resolution
//! - [`extract`] - Per-format line extractors
//! - [`normalize`] - Single-file and multi-file recording normalizers
//! - [`output`] - Uniform CSV writer and the merge buffer
//! - [`report`] - Unmapped-event report
//! - [`batch`] - Folder discovery and the batch driver
//!
//! # Example
//!
//! ```no_run
//! use psgnorm::{run_batch, MappingTable, NormalizeConfig};
//! use std::path::Path;
//!
//! let mapping = MappingTable::load(Path::new("./mappings.txt"))?;
//! let outcome = run_batch(Path::new("./psg"), &mapping, &NormalizeConfig::default())?;
//! outcome.unmapped.save(Path::new("./WSC_non_mapped_lines.txt"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod event;
pub mod extract;
pub mod mapping;
pub mod normalize;
pub mod output;
pub mod paths;
pub mod report;
pub mod timeline;

// Re-export for convenience
pub use batch::{discover_recordings, run_batch, BatchOutcome, BatchSummary};
pub use config::{NormalizeConfig, ScoredLinePolicy};
pub use event::{EventRecord, FieldValue};
pub use extract::{EventExtractor, SourceFormat};
pub use mapping::MappingTable;
pub use normalize::{normalize_recording, RecordingError, RecordingResult, RecordingWarning};
pub use paths::RecordingPaths;
pub use report::{UnmappedEvent, UnmappedReport};
