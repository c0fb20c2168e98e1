//! Fixed six-column CSV writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::EventSink;
use crate::event::{EventRecord, OUTPUT_HEADER};

/// Quote a cell when it contains a separator, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Streams records as `\n`-terminated CSV rows under the fixed header.
pub struct CsvEventWriter<W: Write> {
    out: W,
    rows: usize,
}

impl CsvEventWriter<BufWriter<File>> {
    /// Create (or truncate) the output file and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvEventWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", OUTPUT_HEADER.join(","))?;
        Ok(Self { out, rows: 0 })
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for CsvEventWriter<W> {
    fn write_event(&mut self, record: &EventRecord) -> Result<()> {
        let row: Vec<String> = record.cells().iter().map(|c| escape_field(c)).collect();
        writeln!(self.out, "{}", row.join(","))?;
        self.rows += 1;
        Ok(())
    }

    fn rows_written(&self) -> usize {
        self.rows
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
