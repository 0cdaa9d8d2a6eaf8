//! Typed cell values and column-wide type inference.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Timelike};
use polars::prelude::DataType;
use serde::{Deserialize, Serialize};

/// A single cell of a table.
///
/// `Null` is the explicit missing marker and is distinct from every valid
/// value, including the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing value.
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Naive date-time, microsecond precision.
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Returns true for the missing marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The kind this value contributes to column inference, `None` for missing.
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(ColumnKind::Boolean),
            Self::Integer(_) => Some(ColumnKind::Integer),
            Self::Float(_) => Some(ColumnKind::Float),
            Self::Text(_) => Some(ColumnKind::Text),
            Self::Timestamp(_) => Some(ColumnKind::Timestamp),
        }
    }

    /// Text rendering used when a mixed column is coerced to text.
    ///
    /// Missing values render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(true) => "True".to_string(),
            Self::Boolean(false) => "False".to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => format_float(*v),
            Self::Text(s) => s.clone(),
            Self::Timestamp(ts) => format_timestamp(ts),
        }
    }

    /// The value used to replace a missing cell under the `zero` fill policy.
    pub fn zero_for(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Null | ColumnKind::Integer => Self::Integer(0),
            ColumnKind::Float => Self::Float(0.0),
            ColumnKind::Boolean => Self::Boolean(false),
            ColumnKind::Text => Self::Text("0".to_string()),
            ColumnKind::Timestamp => Self::Timestamp(DateTime::UNIX_EPOCH.naive_utc()),
        }
    }

    /// Hashable identity of the value, used for duplicate detection.
    ///
    /// Two missing cells are equal, all NaNs are equal and `-0.0 == 0.0`.
    pub fn key(&self) -> CellKey {
        match self {
            Self::Null => CellKey::Null,
            Self::Boolean(v) => CellKey::Boolean(*v),
            Self::Integer(v) => CellKey::Integer(*v),
            Self::Float(v) => {
                let bits = if v.is_nan() {
                    f64::NAN.to_bits()
                } else if *v == 0.0 {
                    0.0f64.to_bits()
                } else {
                    v.to_bits()
                };
                CellKey::Float(bits)
            }
            Self::Text(s) => CellKey::Text(s.clone()),
            Self::Timestamp(ts) => CellKey::Timestamp(*ts),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Equality key for a [`CellValue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// Column-wide type derived from the observed cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// No non-missing values were observed.
    Null,
    Boolean,
    Integer,
    Float,
    Text,
    Timestamp,
}

impl ColumnKind {
    /// Infer the column kind from its values.
    ///
    /// Integers and floats unify to `Float`; any other disagreement
    /// falls back to `Text`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut kind = Self::Null;
        for value in values {
            let Some(next) = value.kind() else {
                continue;
            };
            kind = kind.unify(next);
            if kind == Self::Text {
                break;
            }
        }
        kind
    }

    /// Combine two kinds into the narrowest kind that can hold both.
    pub fn unify(self, other: Self) -> Self {
        match (self, other) {
            (Self::Null, kind) | (kind, Self::Null) => kind,
            (left, right) if left == right => left,
            (Self::Integer, Self::Float) | (Self::Float, Self::Integer) => Self::Float,
            _ => Self::Text,
        }
    }

    /// Map a polars dtype onto the kind it stores.
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Null => Self::Null,
            DataType::Boolean => Self::Boolean,
            DataType::Float32 | DataType::Float64 => Self::Float,
            DataType::Datetime(_, _) => Self::Timestamp,
            dtype if dtype.is_integer() => Self::Integer,
            _ => Self::Text,
        }
    }

    /// Lowercase name used in logs and summaries.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shortest round-trip float form, keeping `.0` on whole numbers.
pub(crate) fn format_float(value: f64) -> String {
    format!("{value:?}")
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}
