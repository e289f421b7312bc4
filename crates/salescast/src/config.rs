//! Configuration types for the analytics service.
//!
//! This module provides configuration options using the builder pattern.
//! The ensemble weights used by the forecast engine are fixed constants and
//! are deliberately not part of this configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default dataset used when nothing has been uploaded and configured.
pub const DEFAULT_DATA_PATH: &str = "data/sales.csv";
/// Date column of the default dataset.
pub const DEFAULT_DATE_COLUMN: &str = "Order Date";
/// Metric column of the default dataset.
pub const DEFAULT_METRIC_COLUMN: &str = "Sales";
/// Column grouped by the category view.
pub const DEFAULT_CATEGORY_COLUMN: &str = "Category";
/// Metric summed by the profit trend view.
pub const DEFAULT_PROFIT_COLUMN: &str = "Profit";

/// Configuration for the analytics service.
///
/// Use [`AnalyticsConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use salescast::config::AnalyticsConfig;
///
/// let config = AnalyticsConfig::builder()
///     .default_data_path("data/superstore.csv")
///     .category_column("Segment")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Dataset used when no upload has been configured.
    /// Default: "data/sales.csv"
    pub default_data_path: PathBuf,

    /// Date column of the default dataset.
    /// Default: "Order Date"
    pub default_date_column: String,

    /// Metric column of the default dataset, also the category view's
    /// metric when nothing is configured.
    /// Default: "Sales"
    pub default_metric_column: String,

    /// Column grouped by the category view.
    /// Default: "Category"
    pub category_column: String,

    /// Metric summed by the profit trend view.
    /// Default: "Profit"
    pub profit_column: String,

    /// Number of leading non-empty values probed when deciding whether a
    /// column holds dates.
    /// Default: 5
    pub date_probe_size: usize,

    /// Number of rows returned as `sample_data` after an upload.
    /// Default: 5
    pub sample_rows: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_date_column: DEFAULT_DATE_COLUMN.to_string(),
            default_metric_column: DEFAULT_METRIC_COLUMN.to_string(),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            profit_column: DEFAULT_PROFIT_COLUMN.to_string(),
            date_probe_size: 5,
            sample_rows: 5,
        }
    }
}

impl AnalyticsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalyticsConfigBuilder {
        AnalyticsConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let names = [
            ("default_date_column", &self.default_date_column),
            ("default_metric_column", &self.default_metric_column),
            ("category_column", &self.category_column),
            ("profit_column", &self.profit_column),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if self.date_probe_size == 0 {
            return Err(ConfigValidationError::InvalidProbeSize(self.date_probe_size));
        }

        if self.default_data_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyDataPath);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Invalid date probe size: {0} (must be at least 1)")]
    InvalidProbeSize(usize),

    #[error("Default data path must not be empty")]
    EmptyDataPath,
}

/// Builder for [`AnalyticsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalyticsConfigBuilder {
    default_data_path: Option<PathBuf>,
    default_date_column: Option<String>,
    default_metric_column: Option<String>,
    category_column: Option<String>,
    profit_column: Option<String>,
    date_probe_size: Option<usize>,
    sample_rows: Option<usize>,
}

impl AnalyticsConfigBuilder {
    /// Set the dataset used when no upload has been configured.
    pub fn default_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_data_path = Some(path.into());
        self
    }

    /// Set the date column of the default dataset.
    pub fn default_date_column(mut self, column: impl Into<String>) -> Self {
        self.default_date_column = Some(column.into());
        self
    }

    /// Set the metric column of the default dataset.
    pub fn default_metric_column(mut self, column: impl Into<String>) -> Self {
        self.default_metric_column = Some(column.into());
        self
    }

    /// Set the column grouped by the category view.
    pub fn category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = Some(column.into());
        self
    }

    /// Set the metric summed by the profit trend view.
    pub fn profit_column(mut self, column: impl Into<String>) -> Self {
        self.profit_column = Some(column.into());
        self
    }

    /// Set how many leading values the date probe inspects.
    pub fn date_probe_size(mut self, size: usize) -> Self {
        self.date_probe_size = Some(size);
        self
    }

    /// Set how many rows an upload summary previews.
    pub fn sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalyticsConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalyticsConfig, ConfigValidationError> {
        let defaults = AnalyticsConfig::default();
        let config = AnalyticsConfig {
            default_data_path: self.default_data_path.unwrap_or(defaults.default_data_path),
            default_date_column: self
                .default_date_column
                .unwrap_or(defaults.default_date_column),
            default_metric_column: self
                .default_metric_column
                .unwrap_or(defaults.default_metric_column),
            category_column: self.category_column.unwrap_or(defaults.category_column),
            profit_column: self.profit_column.unwrap_or(defaults.profit_column),
            date_probe_size: self.date_probe_size.unwrap_or(defaults.date_probe_size),
            sample_rows: self.sample_rows.unwrap_or(defaults.sample_rows),
        };

        config.validate()?;
        Ok(config)
    }
}
