//! Structural concatenation of per-file tables.

use std::collections::HashSet;

use polars::prelude::*;
use sheetsync_model::{CellValue, SOURCE_FILE_COLUMN, SourceFrame, cells_to_column, column_cells};

use crate::error::Result;

/// Concatenates tables, aligning columns by name.
///
/// The result holds the union of data columns in first-seen order followed
/// by `source_file`. Rows keep file order, then intra-file order. Cells from
/// a file lacking a column are missing, and each column's type is derived
/// again from the merged values. Zero tables merge into an empty frame.
pub fn merge_frames(frames: &[SourceFrame]) -> Result<DataFrame> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }

    let names = union_columns(frames);
    let total_rows: usize = frames.iter().map(SourceFrame::record_count).sum();
    let mut columns = Vec::with_capacity(names.len());

    for name in &names {
        let mut cells = Vec::with_capacity(total_rows);
        for frame in frames {
            match frame.data.column(name) {
                Ok(column) => cells.extend(column_cells(column)?),
                Err(_) => cells.extend(std::iter::repeat_n(CellValue::Null, frame.record_count())),
            }
        }
        columns.push(cells_to_column(name, &cells)?);
    }

    let merged = DataFrame::new(columns)?;
    tracing::debug!(
        files = frames.len(),
        rows = merged.height(),
        columns = merged.width(),
        "merged tables"
    );
    Ok(merged)
}

fn union_columns(frames: &[SourceFrame]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for frame in frames {
        for name in frame.data_columns() {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
    }
    names.push(SOURCE_FILE_COLUMN.to_string());
    names
}
