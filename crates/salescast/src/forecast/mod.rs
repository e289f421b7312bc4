//! Ensemble forecasting over a monthly series.
//!
//! The forecast for the month after the last observation blends four point
//! estimators with fixed weights:
//!
//! | Estimator                         | Weight |
//! |-----------------------------------|--------|
//! | OLS trend extrapolated one period | 0.4    |
//! | 3-month simple moving average     | 0.3    |
//! | 3-month weighted average (1:2:3)  | 0.2    |
//! | 6-month simple moving average     | 0.1    |
//!
//! The 6-month average falls back to the 3-month one for series shorter
//! than six months. Alongside the blend the engine reports the fitted trend
//! (slope, direction, R²) and a confidence level derived from how volatile
//! the last three months are relative to their mean.

mod moving_average;
mod regression;

pub use moving_average::{population_std, simple_moving_average, weighted_moving_average};
pub use regression::LinearFit;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::aggregation::{MonthKey, MonthlySeries};
use crate::error::{AnalyticsError, Result};
use crate::utils::{mean, round_to};

/// Fewest monthly points the engine accepts.
pub const MIN_FORECAST_POINTS: usize = 3;

const REGRESSION_WEIGHT: f64 = 0.4;
const MA3_WEIGHT: f64 = 0.3;
const WEIGHTED_WEIGHT: f64 = 0.2;
const MA6_WEIGHT: f64 = 0.1;

/// Oldest to newest over the last three months.
const RECENCY_WEIGHTS: [f64; 3] = [1.0, 2.0, 3.0];

const HIGH_CONFIDENCE_RATIO: f64 = 0.2;
const MEDIUM_CONFIDENCE_RATIO: f64 = 0.4;

/// Label reported as the forecast `method`.
pub const ENSEMBLE_METHOD: &str = "Ensemble (Linear Regression + Moving Averages)";

/// Direction of the fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Increasing
        } else if slope < 0.0 {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

/// Rule-based confidence in the blended forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Classify recent volatility against the recent mean.
    pub fn classify(volatility: f64, recent_mean: f64) -> Self {
        if volatility < HIGH_CONFIDENCE_RATIO * recent_mean {
            Self::High
        } else if volatility < MEDIUM_CONFIDENCE_RATIO * recent_mean {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// The four point estimates feeding the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentForecasts {
    #[serde(rename = "linear_regression")]
    pub regression: f64,
    #[serde(rename = "moving_avg_3")]
    pub ma3: f64,
    #[serde(rename = "moving_avg_6")]
    pub ma6: f64,
    #[serde(rename = "weighted_avg")]
    pub weighted: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub direction: TrendDirection,
    pub r_squared: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMetrics {
    pub level: ConfidenceLevel,
    pub volatility: f64,
}

/// Blended forecast for the month after the last observation.
///
/// Every number is rounded to 2 decimal places, except R² (3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    #[serde(rename = "forecast")]
    pub point_forecast: f64,
    pub forecast_period: MonthKey,
    pub method: String,
    pub last_3_months: BTreeMap<MonthKey, f64>,
    #[serde(rename = "forecast_components")]
    pub component_forecasts: ComponentForecasts,
    #[serde(rename = "trend_analysis")]
    pub trend: TrendAnalysis,
    #[serde(rename = "confidence_metrics")]
    pub confidence: ConfidenceMetrics,
}

/// Produces a [`ForecastResult`] from a [`MonthlySeries`].
pub struct ForecastEngine;

impl ForecastEngine {
    /// Forecast the month after the series ends.
    ///
    /// Fails with [`AnalyticsError::InsufficientData`] for fewer than
    /// [`MIN_FORECAST_POINTS`] months.
    pub fn forecast(series: &MonthlySeries) -> Result<ForecastResult> {
        let insufficient = || AnalyticsError::InsufficientData {
            required: MIN_FORECAST_POINTS,
            available: series.len(),
        };

        let last_month = series.last_month().ok_or_else(insufficient)?;
        if series.len() < MIN_FORECAST_POINTS {
            return Err(insufficient());
        }

        let values = series.values();

        let fit = LinearFit::fit(&values).ok_or_else(insufficient)?;
        let regression = fit.predict(values.len() as f64);

        let ma3 = simple_moving_average(&values, 3).ok_or_else(insufficient)?;
        let ma6 = simple_moving_average(&values, 6).unwrap_or(ma3);
        let weighted = weighted_moving_average(&values, &RECENCY_WEIGHTS).unwrap_or(ma3);

        let blended = REGRESSION_WEIGHT * regression
            + MA3_WEIGHT * ma3
            + WEIGHTED_WEIGHT * weighted
            + MA6_WEIGHT * ma6;

        let recent = &values[values.len() - 3..];
        let volatility = population_std(recent);
        let recent_mean = mean(recent).unwrap_or(0.0);
        let level = ConfidenceLevel::classify(volatility, recent_mean);

        debug!(
            "Forecast for {}: regression={:.2} ma3={:.2} ma6={:.2} weighted={:.2} -> {:.2} ({:?})",
            last_month.next(),
            regression,
            ma3,
            ma6,
            weighted,
            blended,
            level
        );

        Ok(ForecastResult {
            point_forecast: round_to(blended, 2),
            forecast_period: last_month.next(),
            method: ENSEMBLE_METHOD.to_string(),
            last_3_months: series
                .tail(3)
                .iter()
                .map(|p| (p.month, round_to(p.value, 2)))
                .collect(),
            component_forecasts: ComponentForecasts {
                regression: round_to(regression, 2),
                ma3: round_to(ma3, 2),
                ma6: round_to(ma6, 2),
                weighted: round_to(weighted, 2),
            },
            trend: TrendAnalysis {
                slope: round_to(fit.slope, 2),
                direction: TrendDirection::from_slope(fit.slope),
                r_squared: round_to(fit.r_squared, 3),
            },
            confidence: ConfidenceMetrics {
                level,
                volatility: round_to(volatility, 2),
            },
        })
    }
}
