//! Per-category totals of a metric column.

use polars::prelude::*;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::debug;

use super::{find_column, kind_in};
use crate::cleaner::NumericCoercer;
use crate::config::{DEFAULT_CATEGORY_COLUMN, DEFAULT_METRIC_COLUMN};
use crate::error::{AnalyticsError, Result};
use crate::types::TableSchema;
use crate::utils::as_text_series;

/// One category and its summed metric.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

/// Category totals sorted from largest to smallest.
///
/// Serializes as `[{"<category column>": label, "<metric>": value}, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    category_field: String,
    metric: String,
    totals: Vec<CategoryTotal>,
}

impl CategorySeries {
    pub fn metric_name(&self) -> &str {
        &self.metric
    }

    pub fn category_field(&self) -> &str {
        &self.category_field
    }

    pub fn totals(&self) -> &[CategoryTotal] {
        &self.totals
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The largest category, if any.
    pub fn top(&self) -> Option<&CategoryTotal> {
        self.totals.first()
    }
}

impl Serialize for CategorySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Row<'a>(&'a CategorySeries, &'a CategoryTotal);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(&self.0.category_field, &self.1.category)?;
                map.serialize_entry(&self.0.metric, &self.1.value)?;
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.totals.len()))?;
        for total in &self.totals {
            seq.serialize_element(&Row(self, total))?;
        }
        seq.end()
    }
}

/// Sums a metric per category label.
///
/// Rows with an invalid metric or a missing/blank label are dropped. The
/// output is sorted descending by total; ties keep the order in which the
/// categories first appear in the table.
#[derive(Debug, Clone)]
pub struct CategoryAggregator {
    category_column: String,
    default_metric: String,
    schema: TableSchema,
}

impl Default for CategoryAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_COLUMN, DEFAULT_METRIC_COLUMN)
    }
}

impl CategoryAggregator {
    /// Group by `category_column`, summing `default_metric` unless a call
    /// names another metric.
    pub fn new(category_column: impl Into<String>, default_metric: impl Into<String>) -> Self {
        Self {
            category_column: category_column.into(),
            default_metric: default_metric.into(),
            schema: TableSchema::default(),
        }
    }

    /// Coerce metrics by the kinds recorded in `schema` rather than by dtype.
    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Aggregate a metric per category.
    ///
    /// Fails with [`AnalyticsError::MissingColumn`] when the category column
    /// is absent and [`AnalyticsError::DataFormat`] when the metric is.
    pub fn aggregate(&self, df: &DataFrame, metric_column: Option<&str>) -> Result<CategorySeries> {
        let metric_column = metric_column.unwrap_or(&self.default_metric);

        let categories = find_column(df, &self.category_column)
            .ok_or_else(|| AnalyticsError::MissingColumn(self.category_column.clone()))?;
        let metric = find_column(df, metric_column)
            .ok_or_else(|| AnalyticsError::column_absent(metric_column))?;

        let labels = as_text_series(categories)?;
        let values = NumericCoercer::coerce_values_as(metric, kind_in(&self.schema, metric))?;

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut totals: Vec<CategoryTotal> = Vec::new();
        let mut dropped = 0usize;

        for (label, value) in labels.str()?.into_iter().zip(values) {
            let (Some(label), Some(value)) = (label.map(str::trim), value) else {
                dropped += 1;
                continue;
            };
            if label.is_empty() {
                dropped += 1;
                continue;
            }

            match index.get(label) {
                Some(&pos) => totals[pos].value += value,
                None => {
                    index.insert(label.to_string(), totals.len());
                    totals.push(CategoryTotal {
                        category: label.to_string(),
                        value,
                    });
                }
            }
        }

        // Stable sort keeps first-appearance order for equal totals
        totals.sort_by(|a, b| b.value.total_cmp(&a.value));

        debug!(
            "Aggregated '{}' into {} categories ({} rows dropped)",
            metric_column,
            totals.len(),
            dropped
        );

        Ok(CategorySeries {
            category_field: self.category_column.clone(),
            metric: metric_column.to_string(),
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnKind, ColumnSchema};
    use pretty_assertions::assert_eq;

    fn orders() -> DataFrame {
        df!(
            "Category" => &[
                Some("Furniture"), Some("Technology"), Some("Office Supplies"),
                Some("Furniture"), None, Some("  "), Some("Technology"),
            ],
            "Sales" => &[
                Some("100"), Some("$250.00"), Some("75"),
                Some("60"), Some("1000"), Some("1000"), Some("oops"),
            ],
            "Profit" => &[10.0, 20.0, 75.0, 5.0, 1.0, 1.0, 3.0]
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_descending() {
        let series = CategoryAggregator::default().aggregate(&orders(), None).unwrap();
        let shown: Vec<(&str, f64)> = series
            .totals()
            .iter()
            .map(|t| (t.category.as_str(), t.value))
            .collect();
        assert_eq!(
            shown,
            vec![
                ("Technology", 250.0),
                ("Furniture", 160.0),
                ("Office Supplies", 75.0),
            ]
        );
        assert_eq!(series.top().unwrap().category, "Technology");
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let series = CategoryAggregator::default()
            .aggregate(&orders(), Some("Profit"))
            .unwrap();
        let names: Vec<&str> = series.totals().iter().map(|t| t.category.as_str()).collect();
        // Office Supplies 75, then Technology 23 vs Furniture 15
        assert_eq!(names, vec!["Office Supplies", "Technology", "Furniture"]);

        let df = df!(
            "Category" => &["B", "A", "C"],
            "Sales" => &[5.0, 5.0, 9.0]
        )
        .unwrap();
        let series = CategoryAggregator::default().aggregate(&df, None).unwrap();
        let names: Vec<&str> = series.totals().iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_schema_guides_metric_coercion() {
        let df = df!(
            "Category" => &["A", "B"],
            "Sales" => &[f64::NAN, 4.0],
            "Code" => &["2024/01/05", "7"]
        )
        .unwrap();
        let schema = TableSchema {
            columns: vec![ColumnSchema {
                name: "Code".to_string(),
                kind: ColumnKind::Date,
            }],
        };
        let aggregator = CategoryAggregator::default().with_schema(schema);

        let sales = aggregator.aggregate(&df, None).unwrap();
        assert_eq!(
            sales.totals().to_vec(),
            vec![CategoryTotal {
                category: "B".to_string(),
                value: 4.0,
            }]
        );

        let codes = aggregator.aggregate(&df, Some("Code")).unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn test_missing_category_column() {
        let df = df!("Sales" => &[1.0]).unwrap();
        let err = CategoryAggregator::default().aggregate(&df, None).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingColumn(ref c) if c == "Category"));
    }

    #[test]
    fn test_missing_metric_column() {
        let df = df!("Category" => &["A"]).unwrap();
        let err = CategoryAggregator::default()
            .aggregate(&df, Some("Revenue"))
            .unwrap_err();
        assert_eq!(err.error_code(), "DATA_FORMAT");
    }

    #[test]
    fn test_serialize_rows() {
        let series = CategoryAggregator::default().aggregate(&orders(), None).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json[0]["Category"], "Technology");
        assert_eq!(json[0]["Sales"], 250.0);
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}
