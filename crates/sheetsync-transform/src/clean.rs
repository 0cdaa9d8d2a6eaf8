//! Cleaning steps applied to the merged table.
//!
//! The steps run in a fixed order: column projection, missing-value fill,
//! duplicate removal, then type normalization. Each is controlled by
//! [`CleaningConfig`] and reports what it changed in a [`CleaningReport`].

use std::collections::HashSet;

use polars::prelude::*;
use serde::Serialize;
use sheetsync_model::{
    CellKey, CellValue, CleaningConfig, ColumnKind, Diagnostics, FillPolicy, SOURCE_FILE_COLUMN,
    cells_to_column, column_cells,
};

use crate::error::Result;
use crate::normalize::{ColumnRetype, normalize_types};

/// What the cleaning steps changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    /// Selected columns that were not present in the table.
    pub missing_columns: Vec<String>,
    /// True when no selected column existed and all columns were kept.
    pub projection_skipped: bool,
    /// Missing cells replaced by the fill policy.
    pub cells_filled: usize,
    /// Rows dropped as exact duplicates.
    pub duplicates_removed: usize,
    pub retyped: Vec<ColumnRetype>,
}

/// Runs every configured cleaning step over `df`.
pub fn clean_table(
    df: DataFrame,
    config: &CleaningConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<(DataFrame, CleaningReport)> {
    let mut report = CleaningReport::default();

    let mut df = match config.selected_columns.as_deref() {
        Some(selected) if !selected.is_empty() => {
            let projection = project_columns(df, selected, diagnostics)?;
            report.missing_columns = projection.missing;
            report.projection_skipped = projection.skipped;
            projection.data
        }
        _ => df,
    };

    report.cells_filled = fill_missing(&mut df, config.fill_policy)?;
    if report.cells_filled > 0 {
        tracing::debug!(
            policy = %config.fill_policy,
            cells = report.cells_filled,
            "filled missing values"
        );
    }

    if config.drop_duplicates {
        let before = df.height();
        df = drop_duplicate_rows(&df)?;
        report.duplicates_removed = before - df.height();
        if report.duplicates_removed > 0 {
            diagnostics.info(&format!(
                "removed {} duplicate rows",
                report.duplicates_removed
            ));
        }
    }

    report.retyped = normalize_types(&mut df)?;

    Ok((df, report))
}

/// Result of [`project_columns`].
#[derive(Debug, Clone)]
pub struct Projection {
    pub data: DataFrame,
    pub missing: Vec<String>,
    pub skipped: bool,
}

/// Keeps the selected columns in selection order, plus `source_file` last.
///
/// Selected names absent from the table are reported as a warning. When
/// none of them exist the table is returned unchanged.
pub fn project_columns(
    df: DataFrame,
    selected: &[String],
    diagnostics: &dyn Diagnostics,
) -> Result<Projection> {
    let mut keep: Vec<&str> = Vec::with_capacity(selected.len() + 1);
    let mut missing = Vec::new();

    for name in selected {
        if name == SOURCE_FILE_COLUMN || keep.contains(&name.as_str()) {
            continue;
        }
        if df.column(name).is_ok() {
            keep.push(name);
        } else if !missing.contains(name) {
            missing.push(name.clone());
        }
    }

    if !missing.is_empty() {
        diagnostics.warn(&format!(
            "selected columns not found: {}",
            missing.join(", ")
        ));
    }

    if keep.is_empty() {
        diagnostics.warn("none of the selected columns exist; keeping all columns");
        return Ok(Projection {
            data: df,
            missing,
            skipped: true,
        });
    }

    if df.column(SOURCE_FILE_COLUMN).is_ok() {
        keep.push(SOURCE_FILE_COLUMN);
    }

    Ok(Projection {
        data: df.select(keep)?,
        missing,
        skipped: false,
    })
}

/// Applies the fill policy to every column, returning the number of cells
/// that were filled.
pub fn fill_missing(df: &mut DataFrame, policy: FillPolicy) -> Result<usize> {
    if policy == FillPolicy::None {
        return Ok(0);
    }

    let mut filled_total = 0;
    let names = df.get_column_names_owned();

    for name in names {
        let column = df.column(&name)?;
        if column.null_count() == 0 {
            continue;
        }
        let kind = ColumnKind::from_dtype(column.dtype());
        let mut cells = column_cells(column)?;
        let filled = fill_cells(&mut cells, policy, kind);
        if filled > 0 {
            filled_total += filled;
            df.with_column(cells_to_column(&name, &cells)?)?;
        }
    }

    Ok(filled_total)
}

/// Fills missing cells in place and returns how many were replaced.
///
/// Leading gaps under `forward` and trailing gaps under `backward` stay
/// missing.
pub fn fill_cells(cells: &mut [CellValue], policy: FillPolicy, kind: ColumnKind) -> usize {
    let mut filled = 0;
    match policy {
        FillPolicy::None => {}
        FillPolicy::Forward => {
            let mut last: Option<CellValue> = None;
            for cell in cells.iter_mut() {
                if cell.is_null() {
                    if let Some(value) = &last {
                        *cell = value.clone();
                        filled += 1;
                    }
                } else {
                    last = Some(cell.clone());
                }
            }
        }
        FillPolicy::Backward => {
            let mut next: Option<CellValue> = None;
            for cell in cells.iter_mut().rev() {
                if cell.is_null() {
                    if let Some(value) = &next {
                        *cell = value.clone();
                        filled += 1;
                    }
                } else {
                    next = Some(cell.clone());
                }
            }
        }
        FillPolicy::Zero => {
            let zero = CellValue::zero_for(kind);
            for cell in cells.iter_mut().filter(|cell| cell.is_null()) {
                *cell = zero.clone();
                filled += 1;
            }
        }
    }
    filled
}

/// Removes rows equal to an earlier row across every column.
///
/// Missing cells compare equal to each other, as do all NaNs.
pub fn drop_duplicate_rows(df: &DataFrame) -> Result<DataFrame> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(df.clone());
    }

    let columns: Vec<Vec<CellValue>> = df
        .get_columns()
        .iter()
        .map(column_cells)
        .collect::<PolarsResult<_>>()?;

    let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row: Vec<CellKey> = columns.iter().map(|cells| cells[idx].key()).collect();
        keep.push(seen.insert(row));
    }

    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    Ok(df.filter(&mask)?)
}
