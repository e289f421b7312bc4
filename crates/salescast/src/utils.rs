//! Shared utilities for inference, coercion and aggregation.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a physical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a calendar date or datetime.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Keep only the characters that can appear in a plain decimal number.
///
/// Everything outside `[0-9.-]` is removed, so currency symbols, thousands
/// separators and stray letters all disappear.
///
/// ```rust,ignore
/// assert_eq!(strip_to_numeric("$1,200.50"), "1200.50");
/// assert_eq!(strip_to_numeric("abc"), "");
/// ```
pub fn strip_to_numeric(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Strip a string with [`strip_to_numeric`] and parse what remains.
///
/// Returns `None` when nothing numeric is left or the remainder is not a
/// valid number (e.g. `"1.2.3"` or a lone `"-"`).
pub fn parse_stripped_numeric(s: &str) -> Option<f64> {
    let stripped = strip_to_numeric(s);
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Series Utilities
// =============================================================================

/// View any column as text, leaving string columns untouched.
pub fn as_text_series(series: &Series) -> PolarsResult<Series> {
    if series.dtype() == &DataType::String {
        Ok(series.clone())
    } else {
        series.cast(&DataType::String)
    }
}

/// Collect the first `limit` non-empty values of a column as trimmed text.
pub fn leading_text_values(series: &Series, limit: usize) -> PolarsResult<Vec<String>> {
    let text = as_text_series(series)?;
    let values = text
        .str()?
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect();
    Ok(values)
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int32), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            DtypeCategory::Datetime
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
        assert_eq!(get_dtype_category(&DataType::Boolean), DtypeCategory::Other);
    }

    #[test]
    fn test_strip_to_numeric() {
        assert_eq!(strip_to_numeric("$1,200.50"), "1200.50");
        assert_eq!(strip_to_numeric("-42 USD"), "-42");
        assert_eq!(strip_to_numeric("€ 1 000"), "1000");
        assert_eq!(strip_to_numeric("abc"), "");
    }

    #[test]
    fn test_parse_stripped_numeric() {
        assert_eq!(parse_stripped_numeric("$1,200.50"), Some(1200.50));
        assert_eq!(parse_stripped_numeric("300"), Some(300.0));
        assert_eq!(parse_stripped_numeric("-7.5%"), Some(-7.5));
        assert_eq!(parse_stripped_numeric("abc"), None);
        assert_eq!(parse_stripped_numeric("1.2.3"), None);
        assert_eq!(parse_stripped_numeric("-"), None);
        assert_eq!(parse_stripped_numeric(""), None);
    }

    #[test]
    fn test_leading_text_values_skips_blanks() {
        let series = Series::new(
            "when".into(),
            &[None, Some(" "), Some("2024-01-05"), Some(""), Some("2024-02-01")],
        );
        let values = leading_text_values(&series, 5).unwrap();
        assert_eq!(values, vec!["2024-01-05", "2024-02-01"]);
    }

    #[test]
    fn test_leading_text_values_limit_and_cast() {
        let series = Series::new("n".into(), &[1i64, 2, 3, 4]);
        let values = leading_text_values(&series, 2).unwrap();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(233.3333, 2), 233.33);
        assert_eq!(round_to(0.98765, 3), 0.988);
        assert_eq!(round_to(286.6666, 2), 286.67);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[100.0, 200.0, 300.0]), Some(200.0));
    }
}
