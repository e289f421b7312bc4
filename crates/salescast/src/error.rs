//! Error types for the sales analytics pipeline.
//!
//! Every failure of inference, aggregation or forecasting is surfaced as an
//! [`AnalyticsError`] value. Errors carry a stable code and a severity so the
//! transport layer can map them to client or server responses without
//! inspecting messages.
//!
//! Errors serialize as `{"error": "...", "code": "..."}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// Whether an error was caused by the caller's input or by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Bad input: missing columns, too little data, invalid configuration.
    Client,
    /// Unexpected failure while reading or computing.
    Server,
}

/// The main error type for the analytics pipeline.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A named column is absent, or the file could not be read as a table.
    #[error("{0}")]
    DataFormat(String),

    /// Too few monthly points to forecast.
    #[error("Insufficient data for forecasting: need at least {required} months, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// A hard-required column (e.g. "Profit", "Category") is absent.
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    /// A caller required at least one aggregated point and none were produced.
    #[error("No valid rows to aggregate for '{0}'")]
    EmptyResult(String),

    /// Configure was called before any dataset was uploaded.
    #[error("No uploaded dataset to configure")]
    NoDatasetUploaded,

    /// The uploaded dataset was replaced or reset while a configure was in flight.
    #[error("Dataset changed while configuring '{0}'")]
    DatasetChanged(String),

    /// Invalid analytics configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Build the `DataFormat` error for a column that is not in the table.
    pub fn column_absent(column: &str) -> Self {
        Self::DataFormat(format!("Column '{}' not found in dataset", column))
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for callers that branch on error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DataFormat(_) => "DATA_FORMAT",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::EmptyResult(_) => "EMPTY_RESULT",
            Self::NoDatasetUploaded => "NO_DATASET_UPLOADED",
            Self::DatasetChanged(_) => "DATASET_CHANGED",
            Self::Config(_) => "INVALID_CONFIG",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Client or server classification, preserved through context wrapping.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DataFormat(_)
            | Self::InsufficientData { .. }
            | Self::MissingColumn(_)
            | Self::EmptyResult(_)
            | Self::NoDatasetUploaded
            | Self::DatasetChanged(_)
            | Self::Config(_) => ErrorSeverity::Client,
            Self::Internal(_) | Self::Io(_) | Self::Polars(_) | Self::Json(_) => {
                ErrorSeverity::Server
            }
            Self::WithContext { source, .. } => source.severity(),
        }
    }

    /// Shorthand for `severity() == ErrorSeverity::Client`.
    pub fn is_client_error(&self) -> bool {
        self.severity() == ErrorSeverity::Client
    }

    /// The innermost error, skipping any context layers.
    pub fn root(&self) -> &AnalyticsError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors are serialized as `{error, code}` so the boundary can forward them as-is.
impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("error", &self.to_string())?;
        state.serialize_field("code", &self.error_code())?;
        state.end()
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            AnalyticsError::MissingColumn("Profit".to_string()).error_code(),
            "MISSING_COLUMN"
        );
        assert_eq!(
            AnalyticsError::column_absent("Order Date").error_code(),
            "DATA_FORMAT"
        );
    }

    #[test]
    fn test_missing_column_distinct_from_data_format() {
        let missing = AnalyticsError::MissingColumn("Profit".to_string());
        let absent = AnalyticsError::column_absent("Order Date");
        assert_ne!(missing.error_code(), absent.error_code());
        assert!(missing.is_client_error());
        assert!(absent.is_client_error());
    }

    #[test]
    fn test_severity() {
        let insufficient = AnalyticsError::InsufficientData {
            required: 3,
            available: 2,
        };
        assert_eq!(insufficient.severity(), ErrorSeverity::Client);
        assert_eq!(
            AnalyticsError::Internal("boom".to_string()).severity(),
            ErrorSeverity::Server
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(AnalyticsError::from(io).severity(), ErrorSeverity::Server);
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalyticsError::InsufficientData {
            required: 3,
            available: 1,
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_DATA");
        assert!(json["error"].as_str().unwrap().contains("at least 3"));
    }

    #[test]
    fn test_with_context() {
        let error = AnalyticsError::MissingColumn("Category".to_string())
            .with_context("During category aggregation");
        assert!(error.to_string().contains("During category aggregation"));
        assert_eq!(error.error_code(), "MISSING_COLUMN");
        assert_eq!(error.severity(), ErrorSeverity::Client);
        assert!(matches!(error.root(), AnalyticsError::MissingColumn(_)));
    }
}
