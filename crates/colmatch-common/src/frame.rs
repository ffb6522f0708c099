//! Polars `AnyValue` and column helpers.

use std::collections::HashSet;

use polars::prelude::*;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use colmatch_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number without trailing fractional zeros.
///
/// # Examples
///
/// ```
/// use colmatch_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(100.0), "100");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Column names of a dataframe in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Renders every cell of a column, `None` for nulls.
pub fn column_strings(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let mut out = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let value = column.get(idx)?;
        if matches!(value, AnyValue::Null) {
            out.push(None);
        } else {
            out.push(Some(any_to_string(value)));
        }
    }
    Ok(out)
}

/// Distinct non-null values of a column in first-seen order.
///
/// Stops after `limit` values when one is given.
pub fn column_unique_values(column: &Column, limit: Option<usize>) -> PolarsResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for idx in 0..column.len() {
        if limit.is_some_and(|limit| out.len() >= limit) {
            break;
        }
        let value = column.get(idx)?;
        if matches!(value, AnyValue::Null) {
            continue;
        }
        let text = any_to_string(value);
        if seen.insert(text.clone()) {
            out.push(text);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(2.50)), "2.5");
        assert_eq!(any_to_string(AnyValue::Float64(10.0)), "10");
        assert_eq!(any_to_string(AnyValue::Float64(-0.0)), "-0");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Int64(3)), Some(3.0));
        assert_eq!(any_to_f64(AnyValue::String(" 1.5 ")), Some(1.5));
        assert_eq!(any_to_f64(AnyValue::String("abc")), None);
        assert_eq!(any_to_f64(AnyValue::Null), None);
    }

    #[test]
    fn test_unique_values_keep_first_seen_order() {
        let column = Series::new(
            "sex".into(),
            vec![Some("M"), None, Some("F"), Some("M"), Some("U")],
        )
        .into_column();
        let values = column_unique_values(&column, None).unwrap();
        assert_eq!(values, vec!["M", "F", "U"]);

        let limited = column_unique_values(&column, Some(2)).unwrap();
        assert_eq!(limited, vec!["M", "F"]);
    }

    #[test]
    fn test_column_strings_marks_nulls() {
        let column = Series::new("age".into(), vec![Some(1i64), None]).into_column();
        assert_eq!(
            column_strings(&column).unwrap(),
            vec![Some("1".to_string()), None]
        );
    }
}
