//! Spreadsheet reading via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use sheetsync_model::{CellValue, cells_to_column};

use crate::error::{IngestError, Result};
use crate::headers::normalize_headers;

/// Reads the first worksheet of a workbook into a DataFrame.
///
/// The first non-empty row is the header row. Fully empty rows are skipped
/// and short rows are padded with missing values.
pub fn read_workbook(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            return Err(IngestError::Workbook {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
        None => {
            return Err(IngestError::EmptyWorkbook {
                path: path.to_path_buf(),
            });
        }
    };

    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|cell| !is_blank(cell)));

    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    };

    let raw_headers: Vec<String> = header_row.iter().map(header_text).collect();
    let headers = normalize_headers(&raw_headers);
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for row in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            let cell = row.get(idx).map(data_to_cell).unwrap_or_default();
            values.push(cell);
        }
    }

    let columns = headers
        .iter()
        .zip(&columns)
        .map(|(name, cells)| cells_to_column(name, cells))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(DataFrame::new(columns)?)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        other => data_to_cell(other).to_text(),
    }
}

/// Maps one calamine cell onto a [`CellValue`].
fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => float_cell(*f),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => CellValue::Timestamp(ts),
            None => float_cell(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_iso_datetime(s) {
            Some(ts) => CellValue::Timestamp(ts),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Spreadsheets store every number as a float; whole values become integers.
fn float_cell(value: f64) -> CellValue {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&value) {
        CellValue::Integer(value as i64)
    } else {
        CellValue::Float(value)
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
