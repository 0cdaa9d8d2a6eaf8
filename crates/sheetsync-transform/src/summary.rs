//! Shape, dtype and per-source summary of the cleaned table.

use std::collections::HashMap;

use polars::prelude::*;
use sheetsync_model::{
    CellValue, ColumnSummary, DataSummary, SOURCE_FILE_COLUMN, SourceCount, column_cells,
};

use crate::error::Result;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Describes a table without modifying it.
///
/// Per-source counts are sorted by row count descending, then file name,
/// and are empty when the table has no `source_file` column.
pub fn summarize(df: &DataFrame) -> Result<DataSummary> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| ColumnSummary {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            null_count: column.null_count(),
        })
        .collect();

    let source_files = match df.column(SOURCE_FILE_COLUMN) {
        Ok(column) => source_counts(column)?,
        Err(_) => Vec::new(),
    };

    Ok(DataSummary {
        total_rows: df.height(),
        total_columns: df.width(),
        columns,
        memory_usage_mb: df.estimated_size() as f64 / BYTES_PER_MIB,
        source_files,
    })
}

fn source_counts(column: &Column) -> Result<Vec<SourceCount>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in column_cells(column)? {
        if let CellValue::Null = cell {
            continue;
        }
        *counts.entry(cell.to_text()).or_default() += 1;
    }

    let mut sources: Vec<SourceCount> = counts
        .into_iter()
        .map(|(file_name, rows)| SourceCount { file_name, rows })
        .collect();
    sources.sort_by(|a, b| b.rows.cmp(&a.rows).then_with(|| a.file_name.cmp(&b.file_name)));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_columns_and_sources() {
        let df = DataFrame::new(vec![
            Series::new("amount".into(), &[Some(1i64), None, Some(3)]).into_column(),
            Series::new(SOURCE_FILE_COLUMN.into(), &["b.xlsx", "a.xlsx", "b.xlsx"]).into_column(),
        ])
        .unwrap();

        let summary = summarize(&df).unwrap();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.total_columns, 2);
        assert_eq!(summary.null_count("amount"), Some(1));
        assert_eq!(summary.dtype("amount"), Some("i64"));
        assert_eq!(summary.source_rows("b.xlsx"), Some(2));
        assert_eq!(summary.source_files[0].file_name, "b.xlsx");
        assert!(summary.memory_usage_mb > 0.0);
    }

    #[test]
    fn empty_table_has_zero_counts() {
        let summary = summarize(&DataFrame::empty()).unwrap();
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.total_columns, 0);
        assert!(summary.columns.is_empty());
        assert!(summary.source_files.is_empty());
    }
}
