//! The analytics service facade.
//!
//! [`SalesAnalytics`] is what a transport layer (HTTP handlers, the CLI)
//! talks to. Each operation resolves the active dataset afresh:
//! - the uploaded dataset, once its date and metric columns are configured
//! - otherwise the default dataset from [`AnalyticsConfig`]
//!
//! Tables and series are never cached between calls.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::aggregation::{
    CategoryAggregator, CategorySeries, MonthlyAggregator, MonthlySeries, ProfitSeries,
    ProfitTrendAggregator,
};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result, ResultExt};
use crate::forecast::{ForecastEngine, ForecastResult};
use crate::loader::load_csv;
use crate::profiler::ColumnInferencer;
use crate::session::{DatasetConfiguration, DatasetSource, SessionStore, configure_with_rows};
use crate::types::{ColumnInference, TableSchema};

/// Which dataset produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Uploaded,
    Default,
}

/// The dataset an operation will read, with its resolved columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveDataset {
    pub source: DataSource,
    pub path: PathBuf,
    pub filename: String,
    pub date_column: String,
    pub metric_column: String,
    /// Kinds resolved at upload; empty for the default dataset, whose
    /// columns are coerced by their loaded dtype.
    #[serde(skip)]
    pub schema: TableSchema,
}

/// Returned by [`SalesAnalytics::upload`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub message: String,
    pub filename: String,
    pub columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub sales_columns: Vec<String>,
    pub row_count: usize,
    /// Leading rows as `{column: value}` objects.
    pub sample_data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Returned by [`SalesAnalytics::configure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigureSummary {
    pub message: String,
    pub date_column: String,
    pub sales_column: String,
    /// Rows with both a valid date and a valid metric.
    pub processed_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip)]
    pub configuration: DatasetConfiguration,
}

/// A [`ForecastResult`] tagged with the dataset it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    #[serde(flatten)]
    pub result: ForecastResult,
    pub data_source: DataSource,
}

/// Upload, configure and query sales data.
#[derive(Debug)]
pub struct SalesAnalytics {
    config: AnalyticsConfig,
    session: SessionStore,
}

impl SalesAnalytics {
    /// Create a service with a validated configuration and an empty session.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: SessionStore::new(),
        })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Load an uploaded CSV, propose candidate columns, and make it the
    /// active upload with no column choice yet.
    ///
    /// Until [`configure`](Self::configure) succeeds, queries keep reading
    /// the default dataset.
    pub fn upload(&self, source: DatasetSource) -> Result<UploadSummary> {
        let df = load_csv(&source.path).context(format!("Failed to load '{}'", source.filename))?;
        let inference = ColumnInferencer::new(self.config.date_probe_size).infer(&df);
        let summary = self.summarize_upload(&source, &df, &inference)?;

        self.session
            .replace(DatasetConfiguration::unconfigured(source).with_schema(inference.schema));
        info!(
            "Uploaded '{}': {} rows, {} date candidate(s), {} metric candidate(s)",
            summary.filename,
            summary.row_count,
            summary.date_columns.len(),
            summary.sales_columns.len()
        );

        Ok(summary)
    }

    fn summarize_upload(
        &self,
        source: &DatasetSource,
        df: &DataFrame,
        inference: &ColumnInference,
    ) -> Result<UploadSummary> {
        Ok(UploadSummary {
            message: "File uploaded successfully".to_string(),
            filename: source.filename.clone(),
            columns: inference.schema.names(),
            date_columns: inference.date_candidates.clone(),
            sales_columns: inference.metric_candidates.clone(),
            row_count: df.height(),
            sample_data: sample_rows(df, self.config.sample_rows)?,
        })
    }

    /// Choose the date and metric columns of the uploaded dataset.
    ///
    /// Validation runs against a snapshot of the session. The choice is
    /// committed only if that upload is still active; a concurrent upload or
    /// reset turns this into [`AnalyticsError::DatasetChanged`].
    pub fn configure(&self, date_column: &str, metric_column: &str) -> Result<ConfigureSummary> {
        let snapshot = self.session.snapshot().ok_or(AnalyticsError::NoDatasetUploaded)?;
        let source = snapshot.source.clone();

        let df = load_csv(&source.path).context(format!("Failed to load '{}'", source.filename))?;
        let (configuration, rows) = configure_with_rows(
            source.clone(),
            snapshot.schema.clone(),
            &df,
            date_column,
            metric_column,
        )?;

        if rows.is_empty() {
            warn!(
                "No row of '{}' has both a valid '{}' and a valid '{}'",
                source.filename, date_column, metric_column
            );
        }

        let date_range = rows
            .iter()
            .map(|(date, _)| *date)
            .min()
            .zip(rows.iter().map(|(date, _)| *date).max())
            .map(|(start, end)| DateRange {
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
            });

        if !self.session.commit_if_source(&source, configuration.clone()) {
            return Err(AnalyticsError::DatasetChanged(source.filename));
        }
        info!(
            "Configured '{}' with date '{}' and metric '{}'",
            source.filename, date_column, metric_column
        );

        Ok(ConfigureSummary {
            message: "Dataset configured successfully".to_string(),
            date_column: date_column.to_string(),
            sales_column: metric_column.to_string(),
            processed_records: rows.len(),
            date_range,
            configuration,
        })
    }

    /// Forget any upload and return to the default dataset.
    pub fn reset(&self) -> bool {
        self.session.clear()
    }

    /// Resolve which dataset and columns the next query would use.
    pub fn active_dataset(&self) -> ActiveDataset {
        if let Some(snapshot) = self.session.snapshot()
            && let Some((date, metric)) = snapshot.columns()
        {
            return ActiveDataset {
                source: DataSource::Uploaded,
                path: snapshot.source.path.clone(),
                filename: snapshot.source.filename.clone(),
                date_column: date.to_string(),
                metric_column: metric.to_string(),
                schema: snapshot.schema.clone(),
            };
        }

        let path = self.config.default_data_path.clone();
        let filename = DatasetSource::from_path(path.clone()).filename;
        ActiveDataset {
            source: DataSource::Default,
            path,
            filename,
            date_column: self.config.default_date_column.clone(),
            metric_column: self.config.default_metric_column.clone(),
            schema: TableSchema::default(),
        }
    }

    fn load_active(&self) -> Result<(ActiveDataset, DataFrame)> {
        let active = self.active_dataset();
        debug!("Reading {:?} dataset '{}'", active.source, active.filename);
        let df = load_csv(&active.path).context(format!("Failed to load '{}'", active.filename))?;
        Ok((active, df))
    }

    /// Metric summed per month of the active dataset.
    pub fn monthly_sales(&self) -> Result<MonthlySeries> {
        let (active, df) = self.load_active()?;
        MonthlyAggregator::aggregate_with_schema(
            &df,
            &active.schema,
            &active.date_column,
            &active.metric_column,
        )
    }

    /// Forecast the month after the active dataset's last month.
    pub fn forecast(&self) -> Result<ForecastReport> {
        let (active, df) = self.load_active()?;
        let series = MonthlyAggregator::aggregate_with_schema(
            &df,
            &active.schema,
            &active.date_column,
            &active.metric_column,
        )?;
        let result = ForecastEngine::forecast(&series)?;

        Ok(ForecastReport {
            result,
            data_source: active.source,
        })
    }

    /// Metric summed per category, largest first.
    ///
    /// Sums `metric_column` when given, otherwise the active metric.
    pub fn category_sales(&self, metric_column: Option<&str>) -> Result<CategorySeries> {
        let (active, df) = self.load_active()?;
        let metric = metric_column.unwrap_or(&active.metric_column);
        CategoryAggregator::new(&self.config.category_column, &self.config.default_metric_column)
            .with_schema(active.schema.clone())
            .aggregate(&df, Some(metric))
    }

    /// Profit summed per month of the active date column.
    pub fn profit_trend(&self) -> Result<ProfitSeries> {
        let (active, df) = self.load_active()?;
        ProfitTrendAggregator::new(&self.config.profit_column)
            .with_schema(active.schema)
            .aggregate(&df, &active.date_column)
    }
}

/// The first `limit` rows as JSON objects keyed by column name.
pub fn sample_rows(df: &DataFrame, limit: usize) -> Result<Vec<Map<String, Value>>> {
    let head = df.head(Some(limit));
    let columns = head.get_columns();

    let mut rows = Vec::with_capacity(head.height());
    for row_idx in 0..head.height() {
        let mut row = Map::with_capacity(columns.len());
        for column in columns {
            let value = column.get(row_idx)?;
            row.insert(column.name().to_string(), any_value_to_json(value));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Convert a cell to JSON; non-finite floats become `null` and other
/// non-primitive values are stringified.
fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(format!("{}", other)),
    }
}

static_assertions::assert_impl_all!(SalesAnalytics: Send, Sync);
