use polars::prelude::AnyValue;
use sheetsync_model::any_to_cell;

/// Renders one cell as CSV field text.
///
/// Missing values are empty, booleans are `True`/`False`, floats use the
/// shortest round-trip form of their stored width and timestamps are
/// `YYYY-MM-DD HH:MM:SS` with microseconds only when non-zero.
pub fn render_any(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format!("{v:?}"),
        AnyValue::String(s) => s.to_string(),
        other => any_to_cell(other).to_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::TimeUnit;

    #[test]
    fn renders_scalars() {
        assert_eq!(render_any(AnyValue::Null), "");
        assert_eq!(render_any(AnyValue::Boolean(false)), "False");
        assert_eq!(render_any(AnyValue::Int8(-4)), "-4");
        assert_eq!(render_any(AnyValue::Float64(3.0)), "3.0");
        assert_eq!(render_any(AnyValue::Float64(0.1)), "0.1");
        assert_eq!(render_any(AnyValue::String("a,b")), "a,b");
    }

    #[test]
    fn float32_uses_its_own_width() {
        assert_eq!(render_any(AnyValue::Float32(0.1)), "0.1");
        assert_eq!(render_any(AnyValue::Float32(2.5)), "2.5");
    }

    #[test]
    fn renders_timestamps() {
        // 2024-01-02 03:04:05 UTC
        let micros = 1_704_164_645_000_000;
        assert_eq!(
            render_any(AnyValue::Datetime(micros, TimeUnit::Microseconds, None)),
            "2024-01-02 03:04:05"
        );
        assert_eq!(
            render_any(AnyValue::Datetime(micros + 500, TimeUnit::Microseconds, None)),
            "2024-01-02 03:04:05.000500"
        );
    }
}
