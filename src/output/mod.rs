//! Delimited batch files
//!
//! The inter-stage handoff format: semicolon-delimited rows appended in
//! batches. A header row is written only when a destination file is first
//! created, and a blank separator line follows each batch write. The
//! source side reads the same format back as string-keyed rows.

mod sink;
mod source;

pub use sink::DelimitedSink;
pub use source::{read_batch_file, Row};

use thiserror::Error;

/// Errors that can occur while writing or reading batch files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed batch file {path}: {message}")]
    Malformed { path: String, message: String },
}

/// Result type for batch file operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Derives a safe file stem from a listing or term name
///
/// Whitespace and path-separator characters are replaced with
/// underscores so the name can be used directly as a destination
/// filename.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_whitespace() {
        assert_eq!(sanitize_name("Ocean View Loft"), "Ocean_View_Loft");
    }

    #[test]
    fn test_sanitize_replaces_path_separators() {
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_keeps_other_chars() {
        assert_eq!(sanitize_name("Casa-do-Mar#2"), "Casa-do-Mar#2");
    }
}
