//! Event-name mapping table.
//!
//! The mapping file is operator-authored, one rule per line:
//!
//! ```text
//! # canonical|alias|alias...
//! apnea_obstructive|respiratory event obstructive apnea|gamma_obst. apnea
//! ```
//!
//! Every alias (and the canonical name) is stored lowercase. Lookups that
//! miss the table return `misc:<key>` so that the event is still written and
//! can be reported later.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::event::{MISC_PREFIX, REPEATED_PIPE_RE};

/// Immutable alias → canonical lookup, built once per batch.
#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    aliases: HashMap<String, String>,
}

impl MappingTable {
    /// Load and parse a mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file {}", path.display()))?;
        let table = Self::parse(&contents)
            .with_context(|| format!("Invalid mapping file {}", path.display()))?;
        debug!(aliases = table.len(), "loaded mapping table");
        Ok(table)
    }

    /// Parse mapping rules from text. A malformed line aborts the whole load.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut aliases = HashMap::new();

        for (idx, raw_line) in contents.lines().enumerate() {
            if raw_line.is_empty() || raw_line.starts_with('#') {
                continue;
            }

            let line = REPEATED_PIPE_RE.replace_all(raw_line, "|");
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < 2 {
                bail!(
                    "Found badly formatted map on line {}: '{}'. Please fix",
                    idx + 1,
                    raw_line
                );
            }

            let canonical = fields[0].to_lowercase();
            for alias in &fields[1..] {
                aliases.insert(alias.to_lowercase(), canonical.clone());
            }
        }

        Ok(Self { aliases })
    }

    /// Map a raw event key to its canonical name, or to `misc:<key>`.
    pub fn resolve(&self, key: &str) -> String {
        let key = key.to_lowercase();
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => format!("{MISC_PREFIX}{key}"),
        }
    }

    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
