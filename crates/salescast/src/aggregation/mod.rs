//! Aggregated views over a raw table.
//!
//! - [`MonthlyAggregator`] sums a metric per calendar month, oldest first
//! - [`CategoryAggregator`] sums a metric per category label, largest first
//! - [`ProfitTrendAggregator`] sums the fixed profit metric per month
//!
//! All three share the same row filter: a row contributes only when every
//! cell it needs is valid after coercion. Invalid rows are dropped silently
//! and only counted in logs.

mod category;
mod month_key;
mod monthly;
mod profit;

pub use category::{CategoryAggregator, CategorySeries, CategoryTotal};
pub use month_key::MonthKey;
pub use monthly::{MonthlyAggregator, MonthlyPoint, MonthlySeries};
pub use profit::{ProfitSeries, ProfitTrendAggregator};

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cleaner::{NumericCoercer, parse_date_column};
use crate::types::{ColumnKind, TableSchema};

/// Look up a column by name.
pub(crate) fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Series> {
    df.column(name).ok().map(|col| col.as_materialized_series())
}

/// Kind of a column per `schema`, falling back to its dtype when the schema
/// does not describe it.
pub(crate) fn kind_in(schema: &TableSchema, series: &Series) -> ColumnKind {
    schema
        .kind_of(series.name().as_str())
        .unwrap_or_else(|| ColumnKind::of_series(series))
}

/// Pair each row's parsed date with its coerced metric, keeping only rows
/// where both are valid.
pub(crate) fn dated_values(
    dates: &Series,
    metric: &Series,
    schema: &TableSchema,
) -> PolarsResult<Vec<(NaiveDate, f64)>> {
    let parsed_dates = parse_date_column(dates)?;
    let values = NumericCoercer::coerce_values_as(metric, kind_in(schema, metric))?;
    let total = parsed_dates.len();

    let rows: Vec<(NaiveDate, f64)> = parsed_dates
        .into_iter()
        .zip(values)
        .filter_map(|(date, value)| Some((date?, value?)))
        .collect();

    if rows.len() < total {
        debug!(
            "Dropped {} of {} rows with an invalid '{}' or '{}' value",
            total - rows.len(),
            total,
            dates.name(),
            metric.name()
        );
    }

    Ok(rows)
}

/// Sum values per calendar month; the map iterates chronologically.
pub(crate) fn sum_by_month(rows: &[(NaiveDate, f64)]) -> BTreeMap<MonthKey, f64> {
    let mut totals = BTreeMap::new();
    for (date, value) in rows {
        *totals.entry(MonthKey::from_date(*date)).or_insert(0.0) += value;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSchema;

    #[test]
    fn test_dated_values_drops_invalid_rows() {
        let dates = Series::new(
            "Order Date".into(),
            &[Some("2024-01-05"), Some("bad"), None, Some("2024-02-01")],
        );
        let metric = Series::new("Sales".into(), &["10", "20", "30", "abc"]);

        let rows = dated_values(&dates, &metric, &TableSchema::default()).unwrap();
        assert_eq!(
            rows,
            vec![(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 10.0)]
        );
    }

    #[test]
    fn test_schema_kind_overrides_dtype() {
        let dates = Series::new("Order Date".into(), &["2024/01/05", "2024/02/11"]);
        let schema = TableSchema {
            columns: vec![ColumnSchema {
                name: "Order Date".to_string(),
                kind: ColumnKind::Date,
            }],
        };
        assert_eq!(kind_in(&schema, &dates), ColumnKind::Date);
        assert_eq!(kind_in(&TableSchema::default(), &dates), ColumnKind::Text);

        // A date column never doubles as its own metric once typed
        assert!(dated_values(&dates, &dates, &schema).unwrap().is_empty());
        assert_eq!(dated_values(&dates, &dates, &TableSchema::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_sum_by_month_is_chronological() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let rows = vec![
            (d(2024, 3, 1), 5.0),
            (d(2023, 12, 31), 1.0),
            (d(2024, 3, 30), 2.5),
        ];
        let totals = sum_by_month(&rows);
        let keys: Vec<String> = totals.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-03"]);
        assert_eq!(totals[&MonthKey::new(2024, 3).unwrap()], 7.5);
    }
}
