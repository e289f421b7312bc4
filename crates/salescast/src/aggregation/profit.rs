//! Monthly profit trend.

use polars::prelude::*;
use serde::Serialize;

use super::{MonthlyAggregator, MonthlySeries, find_column};
use crate::config::DEFAULT_PROFIT_COLUMN;
use crate::error::{AnalyticsError, Result};
use crate::types::TableSchema;

/// Profit summed per month. Serializes like [`MonthlySeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfitSeries(MonthlySeries);

impl ProfitSeries {
    pub fn series(&self) -> &MonthlySeries {
        &self.0
    }

    pub fn into_inner(self) -> MonthlySeries {
        self.0
    }
}

/// Sums the fixed profit column per calendar month.
///
/// A table without the profit column fails with
/// [`AnalyticsError::MissingColumn`], while a missing date column fails with
/// [`AnalyticsError::DataFormat`], so the two cases stay distinguishable.
#[derive(Debug, Clone)]
pub struct ProfitTrendAggregator {
    profit_column: String,
    schema: TableSchema,
}

impl Default for ProfitTrendAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROFIT_COLUMN)
    }
}

impl ProfitTrendAggregator {
    pub fn new(profit_column: impl Into<String>) -> Self {
        Self {
            profit_column: profit_column.into(),
            schema: TableSchema::default(),
        }
    }

    /// Coerce profit by the kind recorded in `schema` rather than by dtype.
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn profit_column(&self) -> &str {
        &self.profit_column
    }

    /// Aggregate profit by month of `date_column`.
    pub fn aggregate(&self, df: &DataFrame, date_column: &str) -> Result<ProfitSeries> {
        if find_column(df, date_column).is_none() {
            return Err(AnalyticsError::column_absent(date_column));
        }
        if find_column(df, &self.profit_column).is_none() {
            return Err(AnalyticsError::MissingColumn(self.profit_column.clone()));
        }

        MonthlyAggregator::aggregate_with_schema(df, &self.schema, date_column, &self.profit_column)
            .map(ProfitSeries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_by_month() {
        let df = df!(
            "Order Date" => &["2024-01-03", "2024-01-28", "2024-02-10"],
            "Profit" => &["-12.5", "40", "(n/a)"]
        )
        .unwrap();

        let profit = ProfitTrendAggregator::default()
            .aggregate(&df, "Order Date")
            .unwrap();
        let json = serde_json::to_value(&profit).unwrap();
        assert_eq!(json, serde_json::json!([{"Month": "2024-01", "Profit": 27.5}]));
    }

    #[test]
    fn test_missing_profit_is_distinct_from_missing_date() {
        let df = df!(
            "Order Date" => &["2024-01-03"],
            "Sales" => &[1.0]
        )
        .unwrap();
        let aggregator = ProfitTrendAggregator::default();

        let err = aggregator.aggregate(&df, "Order Date").unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingColumn(ref c) if c == "Profit"));

        let err = aggregator.aggregate(&df, "Ship Date").unwrap_err();
        assert!(matches!(err, AnalyticsError::DataFormat(_)));
    }
}
