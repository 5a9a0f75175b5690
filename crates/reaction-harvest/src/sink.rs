//! Output sinks for harvested records.
//!
//! CSV is the primary artifact: one header row, then one row per record in
//! the order received. A JSON array sink is provided for tooling.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::{HarvestError, HarvestResult, Record};

/// Header titles, in column order.
pub const CSV_HEADERS: [&str; 5] = [
    "Index",
    "Reaction Type",
    "User Name",
    "Current Role",
    "Profile Link",
];

/// Accepts the ordered record sequence. Must not reorder or mutate it.
pub trait OutputSink {
    /// Persist all records.
    fn write(&mut self, records: &[Record]) -> HarvestResult<()>;
    /// Where the records end up.
    fn path(&self) -> &Path;
}

/// Writes records as comma-separated values.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write header and rows to any writer.
    pub fn write_to<W: Write>(records: &[Record], writer: &mut W) -> std::io::Result<()> {
        write_row(writer, CSV_HEADERS.iter().copied())?;
        for record in records {
            let columns = record.columns();
            write_row(writer, columns.iter().map(String::as_str))?;
        }
        writer.flush()
    }
}

impl OutputSink for CsvSink {
    fn write(&mut self, records: &[Record]) -> HarvestResult<()> {
        let path = self.path.clone();
        let fail = |source: std::io::Error| HarvestError::PersistenceFailure {
            path: path.clone(),
            source,
        };
        let mut writer = create_file(&self.path).map_err(fail)?;
        Self::write_to(records, &mut writer).map_err(fail)?;
        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes records as a pretty-printed JSON array.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for JsonSink {
    fn write(&mut self, records: &[Record]) -> HarvestResult<()> {
        let path = self.path.clone();
        let fail = |source: std::io::Error| HarvestError::PersistenceFailure {
            path: path.clone(),
            source,
        };
        let mut writer = create_file(&self.path).map_err(fail)?;
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(std::io::Error::from)
            .map_err(fail)?;
        writer.flush().map_err(fail)?;
        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn create_file(path: &Path) -> std::io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn write_row<'a, W: Write>(
    writer: &mut W,
    fields: impl Iterator<Item = &'a str>,
) -> std::io::Result<()> {
    let line = fields.map(escape_field).collect::<Vec<_>>().join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
