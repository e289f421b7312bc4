//! Sales Analytics and Forecasting Library
//!
//! Turns an arbitrary tabular sales export into monthly aggregates and a
//! one-month-ahead ensemble forecast, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Column Inference**: Proposes date and metric columns from names and values
//! - **Cleaning**: Parses dates in common formats, strips currency formatting from numbers
//! - **Aggregation**: Monthly totals, per-category totals, monthly profit trend
//! - **Forecasting**: Blends linear regression with simple and weighted moving averages,
//!   reporting trend and a rule-based confidence level
//! - **Session**: One active uploaded dataset, swapped atomically
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use salescast::{AnalyticsConfig, DatasetSource, SalesAnalytics};
//!
//! let service = SalesAnalytics::new(AnalyticsConfig::default())?;
//!
//! // Propose columns for an uploaded file
//! let upload = service.upload(DatasetSource::from_path("uploads/orders.csv"))?;
//! println!("Date candidates: {:?}", upload.date_columns);
//!
//! // Choose columns, then query
//! service.configure("Order Date", "Sales")?;
//! let report = service.forecast()?;
//! println!("Next month: {} ({:?})", report.result.point_forecast, report.result.confidence.level);
//! ```
//!
//! The building blocks can also be used directly on a `DataFrame`:
//!
//! ```rust,ignore
//! use salescast::{ColumnInferencer, ForecastEngine, MonthlyAggregator};
//!
//! let inference = ColumnInferencer::default().infer(&df);
//! let series = MonthlyAggregator::aggregate(&df, "Order Date", "Sales")?;
//! let forecast = ForecastEngine::forecast(&series)?;
//! ```

pub mod aggregation;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod profiler;
pub mod service;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregation::{
    CategoryAggregator, CategorySeries, CategoryTotal, MonthKey, MonthlyAggregator, MonthlyPoint,
    MonthlySeries, ProfitSeries, ProfitTrendAggregator,
};
pub use cleaner::{NumericCoercer, parse_date_column, parse_date_str};
pub use config::{AnalyticsConfig, AnalyticsConfigBuilder, ConfigValidationError};
pub use error::{AnalyticsError, ErrorSeverity, Result as AnalyticsResult, ResultExt};
pub use forecast::{
    ComponentForecasts, ConfidenceLevel, ConfidenceMetrics, ForecastEngine, ForecastResult,
    TrendAnalysis, TrendDirection,
};
pub use loader::load_csv;
pub use profiler::ColumnInferencer;
pub use service::{
    ActiveDataset, ConfigureSummary, DataSource, DateRange, ForecastReport, SalesAnalytics,
    UploadSummary,
};
pub use session::{DatasetConfiguration, DatasetSource, SessionStore, configure_dataset};
pub use types::{ColumnInference, ColumnKind, ColumnSchema, TableSchema};
