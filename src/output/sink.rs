//! Append-only delimited file sink

use crate::output::OutputResult;
use crate::records::Record;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Field delimiter for batch files
pub(crate) const DELIMITER: char = ';';

/// Appends record batches to a single destination file
///
/// The destination is stable for the sink's lifetime. The header row is
/// written only when the file does not yet exist; every append ends with
/// a blank separator line.
#[derive(Debug, Clone)]
pub struct DelimitedSink {
    path: PathBuf,
}

impl DelimitedSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The destination path of this sink
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one batch of records, creating the file (with header) on
    /// first write
    ///
    /// # Arguments
    ///
    /// * `records` - The batch to append; the caller guarantees it is
    ///   non-empty
    pub fn append<R: Record>(&self, records: &[R]) -> OutputResult<()> {
        let is_new = !self.path.exists();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);

        if is_new {
            let header: Vec<String> = R::fields().iter().map(|f| escape_field(f)).collect();
            writeln!(writer, "{}", header.join(&DELIMITER.to_string()))?;
        }

        for record in records {
            let row: Vec<String> = record.values().iter().map(|v| escape_field(v)).collect();
            writeln!(writer, "{}", row.join(&DELIMITER.to_string()))?;
        }

        // Blank separator line closes every batch write
        writeln!(writer)?;
        writer.flush()?;

        Ok(())
    }
}

/// Quotes a field when it contains the delimiter, a quote, or a newline;
/// embedded quotes are doubled
pub(crate) fn escape_field(value: &str) -> String {
    if value.contains(DELIMITER) || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
