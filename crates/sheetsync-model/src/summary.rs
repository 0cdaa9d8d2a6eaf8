//! Read-only description of a table.

use serde::{Deserialize, Serialize};

/// Per-column statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Polars dtype name (e.g. `i8`, `f64`, `str`).
    pub dtype: String,
    pub null_count: usize,
}

/// Row count contributed by one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub file_name: String,
    pub rows: usize,
}

/// Snapshot of a table's shape and contents.
///
/// Recomputed on demand, never mutated in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Column statistics in table order.
    pub columns: Vec<ColumnSummary>,
    /// Approximate in-memory size in MiB.
    pub memory_usage_mb: f64,
    /// Rows per source file, largest first.
    pub source_files: Vec<SourceCount>,
}

impl DataSummary {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn null_count(&self, column: &str) -> Option<usize> {
        self.column(column).map(|c| c.null_count)
    }

    pub fn dtype(&self, column: &str) -> Option<&str> {
        self.column(column).map(|c| c.dtype.as_str())
    }

    pub fn source_rows(&self, file_name: &str) -> Option<usize> {
        self.source_files
            .iter()
            .find(|s| s.file_name == file_name)
            .map(|s| s.rows)
    }

    fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}
