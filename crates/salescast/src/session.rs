//! The single active dataset configuration.
//!
//! The store holds at most one [`DatasetConfiguration`] as an immutable
//! `Arc` snapshot behind a `parking_lot::RwLock`. Writers swap the whole
//! snapshot, so a reader sees either the previous configuration or the new
//! one, never a half-written mix of the two.
//!
//! # Lifecycle
//!
//! ```text
//! upload     -> replace(unconfigured, with the inferred schema)
//! configure  -> snapshot, validate, commit_if_source(..)
//! reset      -> clear()
//! ```

use chrono::NaiveDate;
use parking_lot::RwLock;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregation::MonthlyAggregator;
use crate::error::{AnalyticsError, Result};
use crate::types::TableSchema;

/// Where an uploaded dataset lives and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub path: PathBuf,
    /// Display name reported back to callers.
    pub filename: String,
}

impl DatasetSource {
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
        }
    }

    /// Use the file name component of `path` as the display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, filename }
    }
}

/// The uploaded dataset and, once configured, its chosen columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfiguration {
    pub source: DatasetSource,
    pub date_column: Option<String>,
    pub metric_column: Option<String>,
    /// Column kinds resolved at upload; queries coerce by these.
    #[serde(default)]
    pub schema: TableSchema,
}

impl DatasetConfiguration {
    /// An upload whose columns have not been chosen yet.
    pub fn unconfigured(source: DatasetSource) -> Self {
        Self {
            source,
            date_column: None,
            metric_column: None,
            schema: TableSchema::default(),
        }
    }

    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = schema;
        self
    }

    /// The chosen `(date, metric)` pair, if both are set.
    pub fn columns(&self) -> Option<(&str, &str)> {
        match (&self.date_column, &self.metric_column) {
            (Some(date), Some(metric)) => Some((date.as_str(), metric.as_str())),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.columns().is_some()
    }
}

/// Validate a column choice against the loaded table.
///
/// Both columns must exist; otherwise this fails with
/// [`AnalyticsError::DataFormat`]. Whether any row survives coercion is
/// not checked here.
pub fn configure_dataset(
    source: DatasetSource,
    df: &DataFrame,
    date_column: &str,
    metric_column: &str,
) -> Result<DatasetConfiguration> {
    for column in [date_column, metric_column] {
        if df.column(column).is_err() {
            return Err(AnalyticsError::column_absent(column));
        }
    }

    Ok(DatasetConfiguration {
        source,
        date_column: Some(date_column.to_string()),
        metric_column: Some(metric_column.to_string()),
        schema: TableSchema::default(),
    })
}

/// Validate a column choice and collect the rows it would aggregate,
/// coercing by the upload's `schema`.
pub(crate) fn configure_with_rows(
    source: DatasetSource,
    schema: TableSchema,
    df: &DataFrame,
    date_column: &str,
    metric_column: &str,
) -> Result<(DatasetConfiguration, Vec<(NaiveDate, f64)>)> {
    let config = configure_dataset(source, df, date_column, metric_column)?.with_schema(schema);
    let rows = MonthlyAggregator::valid_rows_with_schema(df, &config.schema, date_column, metric_column)?;
    Ok((config, rows))
}

/// Process-wide holder of the active [`DatasetConfiguration`].
#[derive(Debug, Default)]
pub struct SessionStore {
    active: RwLock<Option<Arc<DatasetConfiguration>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current configuration, if any.
    pub fn snapshot(&self) -> Option<Arc<DatasetConfiguration>> {
        self.active.read().clone()
    }

    /// Install a configuration, returning the one it displaced.
    pub fn replace(&self, config: DatasetConfiguration) -> Option<Arc<DatasetConfiguration>> {
        let previous = self.active.write().replace(Arc::new(config));
        if let Some(prev) = &previous {
            debug!("Replaced session for '{}'", prev.source.filename);
        }
        previous
    }

    /// Install `config` only if the active dataset is still `expected`.
    ///
    /// Returns `false` when the session was cleared or now points at a
    /// different upload; the store is left untouched in that case.
    pub fn commit_if_source(&self, expected: &DatasetSource, config: DatasetConfiguration) -> bool {
        let mut guard = self.active.write();
        match guard.as_ref() {
            Some(current) if current.source == *expected => {
                *guard = Some(Arc::new(config));
                true
            }
            _ => false,
        }
    }

    /// Drop the active configuration. Returns whether one was present.
    pub fn clear(&self) -> bool {
        let cleared = self.active.write().take().is_some();
        if cleared {
            info!("Session cleared");
        }
        cleared
    }
}

static_assertions::assert_impl_all!(SessionStore: Send, Sync);
static_assertions::assert_impl_all!(DatasetConfiguration: Send, Sync);
