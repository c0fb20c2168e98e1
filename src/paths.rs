//! Recording file path management.

use std::path::{Path, PathBuf};

use crate::extract::SourceFormat;

pub const ALLSCORE_SUFFIX: &str = ".allscore.txt";
pub const LOG_SUFFIX: &str = ".log.txt";
pub const SCORED_SUFFIX: &str = ".sco.txt";
pub const STAGE_SUFFIX: &str = ".stg.txt";
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".uniform.txt";

/// Paths to every input and output file of one recording.
#[derive(Clone, Debug)]
pub struct RecordingPaths {
    pub id: String,
    // Single-file format
    pub allscore: PathBuf,
    // Split format
    pub log: PathBuf,
    pub scored: PathBuf,
    pub stage: PathBuf,
    // Uniform output table
    pub output: PathBuf,
}

/// Named path entry for iteration with names.
struct PathEntry<'a> {
    path: &'a PathBuf,
    suffix: &'static str,
}

impl RecordingPaths {
    /// Create paths for recording `id` in `dir`.
    /// Files are named `<id><suffix>`, e.g. `wsc-visit1-100000-nsrr.log.txt`.
    pub fn new(dir: &Path, id: &str, output_suffix: &str) -> Self {
        let file = |suffix: &str| dir.join(format!("{id}{suffix}"));
        Self {
            id: id.to_string(),
            allscore: file(ALLSCORE_SUFFIX),
            log: file(LOG_SUFFIX),
            scored: file(SCORED_SUFFIX),
            stage: file(STAGE_SUFFIX),
            output: file(output_suffix),
        }
    }

    /// The three companion files of the split format.
    fn gamma_paths_with_suffixes(&self) -> [PathEntry<'_>; 3] {
        [
            PathEntry {
                path: &self.log,
                suffix: LOG_SUFFIX,
            },
            PathEntry {
                path: &self.scored,
                suffix: SCORED_SUFFIX,
            },
            PathEntry {
                path: &self.stage,
                suffix: STAGE_SUFFIX,
            },
        ]
    }

    /// Suffix and path of each split-format companion file that does not
    /// exist.
    pub fn missing_gamma_files(&self) -> Vec<(&'static str, &Path)> {
        self.gamma_paths_with_suffixes()
            .into_iter()
            .filter(|entry| !entry.path.exists())
            .map(|entry| (entry.suffix, entry.path.as_path()))
            .collect()
    }

    /// True when the recording has any log file this tool can read.
    pub fn has_event_log(&self) -> bool {
        self.log.exists() || self.allscore.exists()
    }

    /// A single-file log takes precedence over the split format.
    pub fn source_format(&self) -> SourceFormat {
        if self.allscore.exists() {
            SourceFormat::Twin
        } else {
            SourceFormat::Gamma
        }
    }
}
