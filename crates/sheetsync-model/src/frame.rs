//! Per-file frames and conversions between polars columns and [`CellValue`]s.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::{
    AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, PolarsResult, Series, TimeUnit,
};

use crate::value::{CellValue, ColumnKind};

/// Name of the provenance column added to every loaded row.
pub const SOURCE_FILE_COLUMN: &str = "source_file";

/// A table loaded from a single input file.
///
/// The `data` frame always carries a [`SOURCE_FILE_COLUMN`] holding
/// `file_name` on every row.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// Full path of the input file.
    pub path: PathBuf,
    /// Base name written to the `source_file` column.
    pub file_name: String,
    /// Parsed contents.
    pub data: DataFrame,
}

impl SourceFrame {
    pub fn new(path: impl Into<PathBuf>, data: DataFrame) -> Self {
        let path = path.into();
        let file_name = file_name_of(&path);
        Self {
            path,
            file_name,
            data,
        }
    }

    /// Number of data rows.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    /// Column names excluding the provenance column.
    pub fn data_columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != SOURCE_FILE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Converts a polars `AnyValue` into a [`CellValue`].
pub fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Null,
        AnyValue::Boolean(v) => CellValue::Boolean(v),
        AnyValue::Int8(v) => CellValue::Integer(i64::from(v)),
        AnyValue::Int16(v) => CellValue::Integer(i64::from(v)),
        AnyValue::Int32(v) => CellValue::Integer(i64::from(v)),
        AnyValue::Int64(v) => CellValue::Integer(v),
        AnyValue::UInt8(v) => CellValue::Integer(i64::from(v)),
        AnyValue::UInt16(v) => CellValue::Integer(i64::from(v)),
        AnyValue::UInt32(v) => CellValue::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => CellValue::Integer(v),
            Err(_) => CellValue::Float(v as f64),
        },
        AnyValue::Float32(v) => CellValue::Float(f64::from(v)),
        AnyValue::Float64(v) => CellValue::Float(v),
        AnyValue::String(s) => CellValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => CellValue::Text(s.to_string()),
        AnyValue::Datetime(v, unit, _) => datetime_cell(v, unit),
        other => CellValue::Text(other.to_string()),
    }
}

fn datetime_cell(value: i64, unit: TimeUnit) -> CellValue {
    let parsed = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    match parsed {
        Some(ts) => CellValue::Timestamp(ts.naive_utc()),
        None => CellValue::Integer(value),
    }
}

/// Reads every cell of a column in row order.
pub fn column_cells(column: &Column) -> PolarsResult<Vec<CellValue>> {
    let mut cells = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        cells.push(any_to_cell(column.get(idx)?));
    }
    Ok(cells)
}

/// Builds a typed column from cell values.
///
/// The dtype follows [`ColumnKind::infer`]: integers become `Int64`,
/// integer/float mixes `Float64`, timestamps `Datetime[μs]`, all-missing
/// columns `Null`, and any other mix is rendered to text.
pub fn cells_to_column(name: &str, cells: &[CellValue]) -> PolarsResult<Column> {
    let series = match ColumnKind::infer(cells) {
        ColumnKind::Null => Series::full_null(name.into(), cells.len(), &DataType::Null),
        ColumnKind::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Boolean(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Integer(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Float(v) => Some(*v),
                    CellValue::Integer(v) => Some(*v as f64),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Timestamp => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Timestamp(ts) => Some(timestamp_micros(ts)),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| match cell {
                    CellValue::Null => None,
                    other => Some(other.to_text()),
                })
                .collect();
            Series::new(name.into(), values)
        }
    };
    Ok(series.into_column())
}

fn timestamp_micros(ts: &NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_micros()
}
