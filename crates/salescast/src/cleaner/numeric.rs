//! Numeric coercion for metric columns.

use polars::prelude::*;

use crate::types::ColumnKind;
use crate::utils::{as_text_series, is_numeric_dtype, parse_stripped_numeric, strip_to_numeric};

/// Converts a column of mixed cells into `Float64`, nulling what does not parse.
///
/// Natively numeric columns pass through (widened to `f64`), minus `NaN` and
/// infinities. Every other column is read as text, stripped of everything
/// outside `[0-9.-]` and parsed; a cell that still fails becomes null
/// instead of raising. A column whose kind is [`ColumnKind::Date`] holds no
/// metric values at all, so `"2024/01/05"` is never summed as `20240105`.
pub struct NumericCoercer;

impl NumericCoercer {
    /// Coerce a column, deciding the path from its physical dtype.
    pub fn coerce(series: &Series) -> PolarsResult<Series> {
        Self::coerce_as(series, ColumnKind::of_series(series))
    }

    /// Coerce a column whose kind is already known from a [`crate::TableSchema`].
    pub fn coerce_as(series: &Series, kind: ColumnKind) -> PolarsResult<Series> {
        let values = Self::coerce_values_as(series, kind)?;
        Ok(Series::new(series.name().clone(), values))
    }

    /// Coerce a column and return the per-row values directly.
    ///
    /// `None` marks a cell that is missing or could not be read as a number.
    pub fn coerce_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
        Self::coerce_values_as(series, ColumnKind::of_series(series))
    }

    /// Like [`coerce_values`](Self::coerce_values), with the kind taken
    /// from a schema instead of the dtype.
    pub fn coerce_values_as(series: &Series, kind: ColumnKind) -> PolarsResult<Vec<Option<f64>>> {
        match kind {
            ColumnKind::Date => Ok(vec![None; series.len()]),
            ColumnKind::Number if is_numeric_dtype(series.dtype()) => {
                let widened = series.cast(&DataType::Float64)?;
                Ok(widened
                    .f64()?
                    .into_iter()
                    .map(|value| value.filter(|v| v.is_finite()))
                    .collect())
            }
            _ => {
                let text = as_text_series(series)?;
                Ok(text
                    .str()?
                    .into_iter()
                    .map(|cell| cell.and_then(parse_stripped_numeric))
                    .collect())
            }
        }
    }

    /// True when every non-empty cell survives coercion and at least one does.
    ///
    /// Cells that strip down to nothing (e.g. `"N/A"`) count as missing
    /// rather than as failures.
    pub fn is_fully_numeric(series: &Series) -> PolarsResult<bool> {
        if is_numeric_dtype(series.dtype()) {
            let values = Self::coerce_values(series)?;
            return Ok(values.iter().any(Option::is_some));
        }

        let text = as_text_series(series)?;
        let mut parsed = 0usize;
        for cell in text.str()?.into_iter().flatten() {
            let stripped = strip_to_numeric(cell);
            if stripped.is_empty() {
                continue;
            }
            if parse_stripped_numeric(&stripped).is_none() {
                return Ok(false);
            }
            parsed += 1;
        }

        Ok(parsed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_formatted_text() {
        let series = Series::new("Sales".into(), &["$1,200.50", "abc", "300"]);
        let values = NumericCoercer::coerce_values(&series).unwrap();
        assert_eq!(values, vec![Some(1200.50), None, Some(300.0)]);
    }

    #[test]
    fn test_coerce_keeps_nulls() {
        let series = Series::new("Sales".into(), &[Some("10"), None, Some("-2.5")]);
        let values = NumericCoercer::coerce_values(&series).unwrap();
        assert_eq!(values, vec![Some(10.0), None, Some(-2.5)]);
    }

    #[test]
    fn test_numeric_passes_through() {
        let series = Series::new("Sales".into(), &[Some(3i64), None, Some(7)]);
        let coerced = NumericCoercer::coerce(&series).unwrap();
        assert_eq!(coerced.dtype(), &DataType::Float64);
        assert_eq!(coerced.name().as_str(), "Sales");
        let values: Vec<Option<f64>> = coerced.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(3.0), None, Some(7.0)]);
    }

    #[test]
    fn test_coerce_as_text_kind_strips_numeric_looking_text() {
        let series = Series::new("Revenue".into(), &["1 000 USD", "12-5"]);
        let coerced = NumericCoercer::coerce_as(&series, ColumnKind::Text).unwrap();
        let values: Vec<Option<f64>> = coerced.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1000.0), None]);
    }

    #[test]
    fn test_native_non_finite_values_are_nulled() {
        let series = Series::new(
            "Sales".into(),
            &[Some(1.5), Some(f64::NAN), None, Some(f64::INFINITY), Some(2.0)],
        );
        let values = NumericCoercer::coerce_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.5), None, None, None, Some(2.0)]);

        let only_nan = Series::new("Total".into(), &[f64::NAN, f64::NAN]);
        assert!(!NumericCoercer::is_fully_numeric(&only_nan).unwrap());
    }

    #[test]
    fn test_date_kind_yields_no_values() {
        let series = Series::new("Order Date".into(), &["2024/01/05", "2024/02/11"]);

        let as_text = NumericCoercer::coerce_values_as(&series, ColumnKind::Text).unwrap();
        assert_eq!(as_text, vec![Some(20240105.0), Some(20240211.0)]);

        let as_date = NumericCoercer::coerce_values_as(&series, ColumnKind::Date).unwrap();
        assert_eq!(as_date, vec![None, None]);
    }

    #[test]
    fn test_is_fully_numeric() {
        let clean = Series::new("Total".into(), &["$10", "N/A", "1,000.25"]);
        assert!(NumericCoercer::is_fully_numeric(&clean).unwrap());

        let dirty = Series::new("Total".into(), &["$10", "1.2.3"]);
        assert!(!NumericCoercer::is_fully_numeric(&dirty).unwrap());

        let nothing = Series::new("Total".into(), &["n/a", "-"]);
        assert!(!NumericCoercer::is_fully_numeric(&nothing).unwrap());

        let native = Series::new("Total".into(), &[1.5f64, 2.5]);
        assert!(NumericCoercer::is_fully_numeric(&native).unwrap());
    }
}
