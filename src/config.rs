//! Normalization configuration.

use crate::paths::DEFAULT_OUTPUT_SUFFIX;

/// How an unparseable scored-event line affects its recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoredLinePolicy {
    /// The line fails the recording, which aborts the batch.
    #[default]
    Strict,
    /// The line is logged as a warning and skipped.
    Lenient,
}

/// Configuration shared by every recording in a batch.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Suffix appended to the recording id for the uniform output table.
    pub output_suffix: String,

    /// Policy for scored-event lines that match no pattern. Strict matches
    /// the behavior existing outputs were produced with.
    pub scored_line_policy: ScoredLinePolicy,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            scored_line_policy: ScoredLinePolicy::Strict,
        }
    }
}

impl NormalizeConfig {
    pub fn is_lenient(&self) -> bool {
        self.scored_line_policy == ScoredLinePolicy::Lenient
    }
}
