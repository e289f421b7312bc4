//! Monthly aggregation of a metric column.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

use super::{MonthKey, dated_values, find_column, sum_by_month};
use crate::error::{AnalyticsError, Result};
use crate::types::TableSchema;

/// Key used for the month of each serialized row.
pub const MONTH_FIELD: &str = "Month";

/// One month of a [`MonthlySeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyPoint {
    pub month: MonthKey,
    pub value: f64,
}

/// A metric summed per calendar month, strictly increasing by month.
///
/// Serializes as `[{"Month": "YYYY-MM", "<metric>": value}, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    metric: String,
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Build a series from `(month, value)` pairs in any order.
    ///
    /// Pairs sharing a month are summed, so the result always holds one
    /// point per month in chronological order.
    pub fn from_pairs(
        metric: impl Into<String>,
        pairs: impl IntoIterator<Item = (MonthKey, f64)>,
    ) -> Self {
        let mut totals: BTreeMap<MonthKey, f64> = BTreeMap::new();
        for (month, value) in pairs {
            *totals.entry(month).or_insert(0.0) += value;
        }
        Self::from_totals(metric, totals)
    }

    pub(crate) fn from_totals(metric: impl Into<String>, totals: BTreeMap<MonthKey, f64>) -> Self {
        Self {
            metric: metric.into(),
            points: totals
                .into_iter()
                .map(|(month, value)| MonthlyPoint { month, value })
                .collect(),
        }
    }

    /// Name of the summed metric, used as the value key when serialized.
    pub fn metric_name(&self) -> &str {
        &self.metric
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Month keys in chronological order.
    pub fn months(&self) -> Vec<MonthKey> {
        self.points.iter().map(|p| p.month).collect()
    }

    /// Sum over every month.
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// The most recent month, if any.
    pub fn last_month(&self) -> Option<MonthKey> {
        self.points.last().map(|p| p.month)
    }

    /// The final `n` points (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[MonthlyPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }

    /// Fail with [`AnalyticsError::EmptyResult`] when the series has no points.
    pub fn require_non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(AnalyticsError::EmptyResult(self.metric))
        } else {
            Ok(self)
        }
    }
}

struct MonthRow<'a> {
    metric: &'a str,
    point: &'a MonthlyPoint,
}

impl Serialize for MonthRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(MONTH_FIELD, &self.point.month)?;
        map.serialize_entry(self.metric, &self.point.value)?;
        map.end()
    }
}

impl Serialize for MonthlySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.points.len()))?;
        for point in &self.points {
            seq.serialize_element(&MonthRow {
                metric: &self.metric,
                point,
            })?;
        }
        seq.end()
    }
}

/// Sums a metric column per calendar month of a date column.
///
/// 1. Parse the date column; rows with unparseable dates are dropped
/// 2. Coerce the metric column; rows with invalid metric values are dropped
/// 3. Truncate each date to its month and sum per month
/// 4. Emit months in chronological order
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Aggregate `metric_column` by month of `date_column`.
    ///
    /// Fails with [`AnalyticsError::DataFormat`] when either column is
    /// absent. An empty series is a valid result.
    pub fn aggregate(df: &DataFrame, date_column: &str, metric_column: &str) -> Result<MonthlySeries> {
        Self::aggregate_with_schema(df, &TableSchema::default(), date_column, metric_column)
    }

    /// Like [`aggregate`](Self::aggregate), coercing the metric by the kind
    /// `schema` records for it.
    pub fn aggregate_with_schema(
        df: &DataFrame,
        schema: &TableSchema,
        date_column: &str,
        metric_column: &str,
    ) -> Result<MonthlySeries> {
        let rows = Self::valid_rows_with_schema(df, schema, date_column, metric_column)?;
        let series = MonthlySeries::from_totals(metric_column, sum_by_month(&rows));

        debug!(
            "Aggregated {} valid rows of '{}' into {} month(s)",
            rows.len(),
            metric_column,
            series.len()
        );

        Ok(series)
    }

    /// The rows that survive date parsing and metric coercion, in table order.
    pub fn valid_rows(
        df: &DataFrame,
        date_column: &str,
        metric_column: &str,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        Self::valid_rows_with_schema(df, &TableSchema::default(), date_column, metric_column)
    }

    pub fn valid_rows_with_schema(
        df: &DataFrame,
        schema: &TableSchema,
        date_column: &str,
        metric_column: &str,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        let dates =
            find_column(df, date_column).ok_or_else(|| AnalyticsError::column_absent(date_column))?;
        let metric = find_column(df, metric_column)
            .ok_or_else(|| AnalyticsError::column_absent(metric_column))?;

        Ok(dated_values(dates, metric, schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orders() -> DataFrame {
        df!(
            "Order Date" => &[
                Some("2024-03-02"), Some("2024-01-15"), Some("not a date"),
                Some("2024-01-20"), None, Some("2024-02-29"), Some("03/31/2024"),
            ],
            "Sales" => &[
                Some("$100.00"), Some("50"), Some("999"),
                Some("abc"), Some("5"), Some("1,250.5"), Some("25"),
            ]
        )
        .unwrap()
    }

    #[test]
    fn test_aggregate_monthly() {
        let series = MonthlyAggregator::aggregate(&orders(), "Order Date", "Sales").unwrap();

        let shown: Vec<(String, f64)> = series
            .points()
            .iter()
            .map(|p| (p.month.to_string(), p.value))
            .collect();
        assert_eq!(
            shown,
            vec![
                ("2024-01".to_string(), 50.0),
                ("2024-02".to_string(), 1250.5),
                ("2024-03".to_string(), 125.0),
            ]
        );
    }

    #[test]
    fn test_sum_matches_valid_rows() {
        let df = orders();
        let series = MonthlyAggregator::aggregate(&df, "Order Date", "Sales").unwrap();
        let rows = MonthlyAggregator::valid_rows(&df, "Order Date", "Sales").unwrap();
        let expected: f64 = rows.iter().map(|(_, v)| v).sum();

        assert_eq!(rows.len(), 4);
        assert!((series.total() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_months_strictly_increasing() {
        let series = MonthlyAggregator::aggregate(&orders(), "Order Date", "Sales").unwrap();
        let keys: Vec<String> = series.months().iter().map(ToString::to_string).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_columns_are_data_format_errors() {
        let df = orders();
        let err = MonthlyAggregator::aggregate(&df, "Ship Date", "Sales").unwrap_err();
        assert_eq!(err.error_code(), "DATA_FORMAT");
        assert!(err.to_string().contains("Ship Date"));

        let err = MonthlyAggregator::aggregate(&df, "Order Date", "Revenue").unwrap_err();
        assert_eq!(err.error_code(), "DATA_FORMAT");
    }

    #[test]
    fn test_empty_series_is_valid_unless_required() {
        let df = df!(
            "Order Date" => &["someday", "never"],
            "Sales" => &[1.0, 2.0]
        )
        .unwrap();
        let series = MonthlyAggregator::aggregate(&df, "Order Date", "Sales").unwrap();
        assert!(series.is_empty());

        let err = series.require_non_empty().unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_RESULT");
    }

    #[test]
    fn test_serialize_rows() {
        let series = MonthlySeries::from_pairs(
            "Sales",
            vec![
                (MonthKey::new(2024, 2).unwrap(), 20.0),
                (MonthKey::new(2024, 1).unwrap(), 10.0),
                (MonthKey::new(2024, 2).unwrap(), 5.0),
            ],
        );
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"Month": "2024-01", "Sales": 10.0},
                {"Month": "2024-02", "Sales": 25.0}
            ])
        );
    }

    #[test]
    fn test_tail() {
        let series = MonthlySeries::from_pairs(
            "Sales",
            (1..=5).map(|m| (MonthKey::new(2024, m).unwrap(), m as f64)),
        );
        let tail: Vec<f64> = series.tail(3).iter().map(|p| p.value).collect();
        assert_eq!(tail, vec![3.0, 4.0, 5.0]);
        assert_eq!(series.tail(10).len(), 5);
    }
}
