//! Error types for source discovery and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or loading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Discovery Errors ===
    /// Input directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File-name pattern is not a valid glob.
    #[error("invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// No file in the directory matched the pattern.
    #[error("no input files found in {dir} matching pattern {pattern}")]
    NoInputFiles { dir: PathBuf, pattern: String },

    /// Every discovered file failed to load.
    #[error("none of the {attempted} input files could be read")]
    NoValidData { attempted: usize },

    // === File Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension has no reader.
    #[error("unsupported file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// File uses an unsupported text encoding.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Parsing Errors ===
    /// Failed to open or parse a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Workbook has no worksheet or no header row.
    #[error("workbook has no header row: {path}")]
    EmptyWorkbook { path: PathBuf },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// True for errors that abort the run rather than skipping one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. }
                | Self::DirectoryRead { .. }
                | Self::InvalidPattern { .. }
                | Self::NoInputFiles { .. }
                | Self::NoValidData { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::NoInputFiles {
            dir: PathBuf::from("/data/raw"),
            pattern: "*.xlsx".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no input files found in /data/raw matching pattern *.xlsx"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(IngestError::NoValidData { attempted: 2 }.is_fatal());
        assert!(
            !IngestError::EmptyWorkbook {
                path: PathBuf::from("a.xlsx")
            }
            .is_fatal()
        );
    }
}
