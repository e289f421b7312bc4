//! CLI entry point for the sales analytics service.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use salescast::{
    AnalyticsConfig, AnalyticsError, CategorySeries, ConfigureSummary, DatasetSource,
    ForecastReport, MonthlySeries, SalesAnalytics, UploadSummary,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overrides the default dataset path.
const DATA_PATH_ENV: &str = "SALESCAST_DATA_PATH";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Monthly sales aggregation and ensemble forecasting",
    long_about = "Aggregate a sales CSV by month and forecast the next month.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SALESCAST_DATA_PATH   Default dataset when --file is not given\n  \
                  RUST_LOG              Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Propose date and metric columns\n  \
                  salescast inspect orders.csv\n\n  \
                  # Forecast from an uploaded file\n  \
                  salescast --file orders.csv --date-column \"Order Date\" --metric-column Sales forecast\n\n  \
                  # Monthly totals of the default dataset as JSON\n  \
                  salescast --json sales"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// CSV file to analyze instead of the default dataset
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Date column of --file
    ///
    /// If not specified, the single inferred date column is used
    #[arg(long, global = true)]
    date_column: Option<String>,

    /// Metric column of --file
    ///
    /// If not specified, the single inferred metric column is used
    #[arg(long, global = true)]
    metric_column: Option<String>,

    /// JSON file with analytics configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logging; errors are printed as {"error", "code"}.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Propose date and metric columns for a CSV file
    Inspect {
        /// CSV file to inspect
        path: PathBuf,
    },
    /// Metric summed per month
    Sales,
    /// Forecast the month after the last observation
    Forecast,
    /// Metric summed per category, largest first
    Categories {
        /// Metric to sum instead of the active one
        #[arg(long)]
        metric: Option<String>,
    },
    /// Profit summed per month
    Profit,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter = EnvFilter::try_new(log_directive(effective_level))
        .unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` (possibly from `.env`) when set, otherwise `level`.
fn log_directive(level: &str) -> String {
    std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| level.to_string())
}

fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(()) => Ok(()),
        Err(err) if args.json => {
            if let Some(analytics) = err.downcast_ref::<AnalyticsError>() {
                println!("{}", serde_json::to_string_pretty(analytics)?);
            } else {
                let fallback = serde_json::json!({ "error": err.to_string(), "code": "INTERNAL_ERROR" });
                println!("{}", serde_json::to_string_pretty(&fallback)?);
            }
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let service = SalesAnalytics::new(config)?;

    if let Command::Inspect { path } = &args.command {
        let summary = service.upload(DatasetSource::from_path(path.clone()))?;
        return emit(args.json, &summary, print_upload);
    }

    if let Some(file) = &args.file {
        let upload = service.upload(DatasetSource::from_path(file.clone()))?;
        let (date, metric) = choose_columns(args, &upload)?;
        let configured = service.configure(&date, &metric)?;
        if !args.json && !args.quiet {
            print_configure(&configured);
        }
    }

    match &args.command {
        Command::Inspect { .. } => Ok(()),
        Command::Sales => emit(args.json, &service.monthly_sales()?, print_monthly),
        Command::Forecast => emit(args.json, &service.forecast()?, print_forecast),
        Command::Categories { metric } => emit(
            args.json,
            &service.category_sales(metric.as_deref())?,
            print_categories,
        ),
        Command::Profit => {
            let profit = service.profit_trend()?;
            emit(args.json, profit.series(), print_monthly)
        }
    }
}

/// Defaults, then the optional JSON file, then the environment.
fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            let parsed: AnalyticsConfig = serde_json::from_str(&raw).map_err(|e| {
                AnalyticsError::from(e).with_context(format!("Invalid config file {}", path.display()))
            })?;
            info!("Loaded configuration from {}", path.display());
            parsed
        }
        None => AnalyticsConfig::default(),
    };

    if let Ok(data_path) = std::env::var(DATA_PATH_ENV)
        && !data_path.trim().is_empty()
    {
        debug!("{} overrides default dataset: {}", DATA_PATH_ENV, data_path);
        config.default_data_path = PathBuf::from(data_path);
    }

    config.validate().map_err(AnalyticsError::from)?;
    Ok(config)
}

/// Explicit flags win; otherwise the inferred candidate must be unique.
fn choose_columns(args: &Args, upload: &UploadSummary) -> Result<(String, String)> {
    let pick = |explicit: &Option<String>, candidates: &[String], what: &str| -> Result<String> {
        if let Some(column) = explicit {
            return Ok(column.clone());
        }
        match candidates {
            [only] => Ok(only.clone()),
            [] => Err(anyhow!(
                "No {} column detected in {}; pass --{}-column",
                what,
                upload.filename,
                what
            )),
            many => Err(anyhow!(
                "Several {} columns detected in {} ({}); pass --{}-column",
                what,
                upload.filename,
                many.join(", "),
                what
            )),
        }
    };

    Ok((
        pick(&args.date_column, &upload.date_columns, "date")?,
        pick(&args.metric_column, &upload.sales_columns, "metric")?,
    ))
}

fn emit<T: Serialize>(json: bool, value: &T, human: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_upload(summary: &UploadSummary) {
    println!("\n{}", "=".repeat(60));
    println!("DATASET: {}", summary.filename);
    println!("{}\n", "=".repeat(60));
    println!("  Rows: {}", summary.row_count);
    println!("  Columns: {}", summary.columns.join(", "));
    println!("  Date candidates: {}", list_or_none(&summary.date_columns));
    println!("  Metric candidates: {}", list_or_none(&summary.sales_columns));
    println!();
}

fn print_configure(summary: &ConfigureSummary) {
    println!(
        "Using '{}' by '{}' ({} valid rows{})",
        summary.sales_column,
        summary.date_column,
        summary.processed_records,
        summary
            .date_range
            .as_ref()
            .map(|r| format!(", {} to {}", r.start, r.end))
            .unwrap_or_default()
    );
}

fn print_monthly(series: &MonthlySeries) {
    println!("{:<10} {:>16}", "Month", series.metric_name());
    println!("{}", "-".repeat(27));
    for point in series.points() {
        println!("{:<10} {:>16.2}", point.month.to_string(), point.value);
    }
    println!("{}", "-".repeat(27));
    println!("{:<10} {:>16.2}", "Total", series.total());
}

fn print_categories(series: &CategorySeries) {
    println!("{:<24} {:>16}", series.category_field(), series.metric_name());
    println!("{}", "-".repeat(41));
    for total in series.totals() {
        println!("{:<24} {:>16.2}", truncate_str(&total.category, 23), total.value);
    }
}

fn print_forecast(report: &ForecastReport) {
    let result = &report.result;
    println!("\n{}", "=".repeat(60));
    println!("FORECAST for {} ({:?} dataset)", result.forecast_period, report.data_source);
    println!("{}\n", "=".repeat(60));
    println!("  Forecast: {:.2}", result.point_forecast);
    println!("  Method: {}", result.method);
    println!();
    println!("  Components:");
    println!("    Linear regression   {:>14.2}", result.component_forecasts.regression);
    println!("    3-month average     {:>14.2}", result.component_forecasts.ma3);
    println!("    6-month average     {:>14.2}", result.component_forecasts.ma6);
    println!("    Weighted average    {:>14.2}", result.component_forecasts.weighted);
    println!();
    println!(
        "  Trend: {:?} (slope {:.2}, R² {:.3})",
        result.trend.direction, result.trend.slope, result.trend.r_squared
    );
    println!(
        "  Confidence: {:?} (volatility {:.2})",
        result.confidence.level, result.confidence.volatility
    );
    println!();
    println!("  Last 3 months:");
    for (month, value) in &result.last_3_months {
        println!("    {}  {:>14.2}", month, value);
    }
    println!();
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
