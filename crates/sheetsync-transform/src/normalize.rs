//! Column type normalization.
//!
//! Text columns holding only numbers become numeric, wide integer columns
//! are narrowed to the smallest signed width that holds their range, and
//! `f64` columns whose values are all exactly representable become `f32`.
//! Every narrowing is checked by casting back; a lossy result keeps the
//! original column.

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// A column whose dtype changed during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRetype {
    pub column: String,
    pub from: String,
    pub to: String,
}

/// Normalizes the dtype of every column in place.
pub fn normalize_types(df: &mut DataFrame) -> Result<Vec<ColumnRetype>> {
    let mut retyped = Vec::new();
    let names: Vec<PlSmallStr> = df.get_column_names_owned();

    for name in names {
        let column = df.column(&name)?;
        let original = column.as_materialized_series();
        let from = original.dtype().clone();

        let replacement = match &from {
            DataType::String => parse_numeric_text(original)?,
            DataType::Int16 | DataType::Int32 | DataType::Int64 => narrow_integer(original)?,
            DataType::Float64 => narrow_float(original)?,
            _ => None,
        };

        if let Some(series) = replacement {
            tracing::debug!(
                column = %name,
                from = %from,
                to = %series.dtype(),
                "normalized column type"
            );
            retyped.push(ColumnRetype {
                column: name.to_string(),
                from: from.to_string(),
                to: series.dtype().to_string(),
            });
            df.with_column(series)?;
        }
    }

    Ok(retyped)
}

/// Smallest signed integer dtype whose range contains `min..=max`.
///
/// `Int8`, `Int16` and `Int32` are considered; anything wider is `Int64`.
pub fn smallest_integer_dtype(min: i64, max: i64) -> DataType {
    let fits = |lo: i64, hi: i64| min >= lo && max <= hi;
    if fits(i64::from(i8::MIN), i64::from(i8::MAX)) {
        DataType::Int8
    } else if fits(i64::from(i16::MIN), i64::from(i16::MAX)) {
        DataType::Int16
    } else if fits(i64::from(i32::MIN), i64::from(i32::MAX)) {
        DataType::Int32
    } else {
        DataType::Int64
    }
}

fn parse_numeric_text(series: &Series) -> Result<Option<Series>> {
    let values = series.str()?;
    if values.null_count() == values.len() {
        return Ok(None);
    }

    let ints: Option<Vec<Option<i64>>> = values
        .into_iter()
        .map(|value| match value {
            None => Some(None),
            Some(text) => text.trim().parse::<i64>().ok().map(Some),
        })
        .collect();
    if let Some(ints) = ints {
        return Ok(Some(Series::new(series.name().clone(), ints)));
    }

    let floats: Option<Vec<Option<f64>>> = values
        .into_iter()
        .map(|value| match value {
            None => Some(None),
            Some(text) => parse_float_text(text.trim()).map(Some),
        })
        .collect();
    Ok(floats.map(|floats| Series::new(series.name().clone(), floats)))
}

/// Largest magnitude below which every integer is exact in an `f64`.
const F64_EXACT_INT: u64 = 1 << 53;

/// Parses one text value as `f64`, refusing values that would not survive.
///
/// Integer-looking text must be exactly representable; finite text must
/// not overflow to infinity.
fn parse_float_text(text: &str) -> Option<f64> {
    let value = text.parse::<f64>().ok()?;
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        let exact = text.parse::<i64>().ok()?;
        return (exact.unsigned_abs() <= F64_EXACT_INT).then_some(value);
    }
    if value.is_infinite() && !digits.to_ascii_lowercase().starts_with("inf") {
        return None;
    }
    Some(value)
}

fn narrow_integer(series: &Series) -> Result<Option<Series>> {
    let wide = series.cast(&DataType::Int64)?;
    let values = wide.i64()?;
    let (Some(min), Some(max)) = (values.min(), values.max()) else {
        return Ok(None);
    };

    let target = smallest_integer_dtype(min, max);
    if &target == series.dtype() || target == DataType::Int64 {
        return Ok(None);
    }
    verified_cast(series, &target)
}

fn narrow_float(series: &Series) -> Result<Option<Series>> {
    let values = series.f64()?;
    let exact = values.into_iter().all(|value| match value {
        None => true,
        Some(v) => v.is_nan() || f64::from(v as f32) == v,
    });
    if !exact {
        return Ok(None);
    }
    verified_cast(series, &DataType::Float32)
}

/// Casts to `target` and keeps the result only if casting back restores
/// the original values and null positions.
fn verified_cast(series: &Series, target: &DataType) -> Result<Option<Series>> {
    let narrowed = series.cast(target)?;
    let restored = narrowed.cast(series.dtype())?;
    if narrowed.null_count() != series.null_count() || !same_values(&restored, series)? {
        return Ok(None);
    }
    Ok(Some(narrowed))
}

fn same_values(left: &Series, right: &Series) -> Result<bool> {
    if left.dtype().is_float() {
        let (left, right) = (left.f64()?, right.f64()?);
        return Ok(left.into_iter().zip(right).all(|pair| match pair {
            (None, None) => true,
            (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }));
    }
    Ok(left.equals_missing(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn smallest_integer_widths() {
        assert_eq!(smallest_integer_dtype(-128, 127), DataType::Int8);
        assert_eq!(smallest_integer_dtype(0, 128), DataType::Int16);
        assert_eq!(smallest_integer_dtype(-40_000, 0), DataType::Int32);
        assert_eq!(smallest_integer_dtype(0, i64::from(i32::MAX) + 1), DataType::Int64);
    }

    #[test]
    fn narrows_small_integers() {
        let mut df = frame(vec![
            Series::new("qty".into(), &[Some(1i64), None, Some(100)]).into_column(),
        ]);
        let retyped = normalize_types(&mut df).unwrap();

        assert_eq!(df.column("qty").unwrap().dtype(), &DataType::Int8);
        assert_eq!(df.column("qty").unwrap().null_count(), 1);
        assert_eq!(retyped[0].from, "i64");
        assert_eq!(retyped[0].to, "i8");
    }

    #[test]
    fn leaves_wide_integers() {
        let mut df = frame(vec![
            Series::new("id".into(), &[1i64, 5_000_000_000]).into_column(),
        ]);
        let retyped = normalize_types(&mut df).unwrap();
        assert!(retyped.is_empty());
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn narrows_exact_floats_only() {
        let mut df = frame(vec![
            Series::new("half".into(), &[0.5f64, 2.25]).into_column(),
            Series::new("tenth".into(), &[0.1f64, 2.0]).into_column(),
        ]);
        normalize_types(&mut df).unwrap();

        assert_eq!(df.column("half").unwrap().dtype(), &DataType::Float32);
        assert_eq!(df.column("tenth").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn parses_numeric_text() {
        let mut df = frame(vec![
            Series::new("ints".into(), &[Some(" 12 "), None, Some("-3")]).into_column(),
            Series::new("floats".into(), &[Some("1.5"), Some("2"), None]).into_column(),
            Series::new("words".into(), &[Some("1"), Some("two"), None]).into_column(),
            Series::new("blank".into(), &[None::<&str>, None, None]).into_column(),
        ]);
        let retyped = normalize_types(&mut df).unwrap();

        assert_eq!(df.column("ints").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("ints").unwrap().get(0).unwrap(), AnyValue::Int64(12));
        assert_eq!(df.column("floats").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("words").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("blank").unwrap().dtype(), &DataType::String);
        assert_eq!(retyped.len(), 2);
    }

    #[test]
    fn integer_text_beyond_i64_stays_text() {
        let mut df = frame(vec![
            Series::new(
                "serial".into(),
                &["12345678901234567891", "98765432109876543211"],
            )
            .into_column(),
            Series::new("mixed".into(), &["9007199254740993", "0.5"]).into_column(),
            Series::new("huge".into(), &["1e400", "1.5"]).into_column(),
        ]);
        let retyped = normalize_types(&mut df).unwrap();

        assert!(retyped.is_empty());
        let serial = df.column("serial").unwrap();
        assert_eq!(serial.dtype(), &DataType::String);
        assert_eq!(
            serial.get(0).unwrap(),
            AnyValue::String("12345678901234567891")
        );
        assert_eq!(df.column("mixed").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("huge").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn small_integer_text_mixed_with_decimals_becomes_float() {
        let mut df = frame(vec![
            Series::new("price".into(), &["3", "-0.25"]).into_column(),
        ]);
        normalize_types(&mut df).unwrap();

        let price = df.column("price").unwrap();
        assert!(price.dtype().is_float());
        assert_eq!(price.get(0).unwrap().extract::<f64>(), Some(3.0));
    }

    #[test]
    fn other_types_untouched() {
        let mut df = frame(vec![
            Series::new("flag".into(), &[true, false]).into_column(),
            Series::new("small".into(), &[1i8, 2]).into_column(),
        ]);
        assert!(normalize_types(&mut df).unwrap().is_empty());
    }
}
