//! Row-oriented reader for delimited batch files

use crate::output::sink::DELIMITER;
use crate::output::{OutputError, OutputResult};
use std::collections::HashMap;
use std::path::Path;

/// One data row from a batch file, keyed by header column name
#[derive(Debug, Clone)]
pub struct Row {
    columns: HashMap<String, String>,
}

impl Row {
    /// Looks up a column value by header name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

/// Reads a batch file back as string-keyed rows
///
/// The first non-blank line names the columns; blank separator lines
/// between batches are skipped. Rows with a different field count than
/// the header are rejected.
pub fn read_batch_file(path: &Path) -> OutputResult<Vec<Row>> {
    let content = std::fs::read_to_string(path)?;
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header = match lines.next() {
        Some(line) => split_row(line),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for line in lines {
        let values = split_row(line);
        if values.len() != header.len() {
            return Err(OutputError::Malformed {
                path: path.display().to_string(),
                message: format!(
                    "row has {} fields, header has {}",
                    values.len(),
                    header.len()
                ),
            });
        }
        let columns = header.iter().cloned().zip(values).collect();
        rows.push(Row { columns });
    }

    Ok(rows)
}

/// Splits one delimited line into fields, honoring quoting
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == DELIMITER {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields
}
