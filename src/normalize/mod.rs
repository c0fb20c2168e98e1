//! Per-recording normalization.
//!
//! A recording is normalized in one of two modes, chosen by which files it
//! has on disk:
//!
//! - [`twin`]: one `allscore` file, streamed in input order
//! - [`gamma`]: `log`, `stg` and `sco` files merged onto one timeline
//!
//! Both modes return a [`RecordingResult`]. Data problems are collected in
//! the result, while I/O failures are returned as errors.

pub mod gamma;
pub mod input;
pub mod result;
pub mod twin;

use anyhow::Result;
use tracing::debug;

use crate::config::NormalizeConfig;
use crate::extract::SourceFormat;
use crate::mapping::MappingTable;
use crate::paths::RecordingPaths;

pub use gamma::{normalize_gamma, GammaMerger, ReadOutcome};
pub use result::{RecordingError, RecordingResult, RecordingWarning};
pub use twin::{normalize_twin, normalize_twin_lines};

/// Normalize one recording in the mode its files call for.
pub fn normalize_recording(
    paths: &RecordingPaths,
    mapping: &MappingTable,
    config: &NormalizeConfig,
) -> Result<RecordingResult> {
    let format = paths.source_format();
    debug!(recording = %paths.id, %format, "normalizing recording");
    match format {
        SourceFormat::Twin => normalize_twin(paths, mapping),
        SourceFormat::Gamma => normalize_gamma(paths, mapping, config),
    }
}
