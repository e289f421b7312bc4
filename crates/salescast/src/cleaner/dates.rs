//! Date parsing for native and text date columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

use crate::utils::{as_text_series, is_numeric_dtype};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Year-month only ("2024-03", "2024/3"), read as the first of the month
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("Invalid regex: YYYY-MM"));

/// Parse one text cell as a calendar date.
///
/// Accepts ISO dates, US and day-first slash dates, long month names,
/// datetimes (time of day is discarded), RFC 3339/2822 timestamps and bare
/// year-month values. Bare numbers are never read as dates.
pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(datetime.date_naive());
    }

    let caps = YEAR_MONTH.captures(trimmed)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse a whole column into calendar dates, one entry per row.
///
/// Native `Date`/`Datetime` columns convert directly. Numeric columns yield
/// no dates. Every other column is read as text through [`parse_date_str`].
pub fn parse_date_column(series: &Series) -> PolarsResult<Vec<Option<NaiveDate>>> {
    match series.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(days_to_date))
                .collect())
        }
        dtype if is_numeric_dtype(dtype) => Ok(vec![None; series.len()]),
        _ => {
            let text = as_text_series(series)?;
            Ok(text
                .str()?
                .into_iter()
                .map(|cell| cell.and_then(parse_date_str))
                .collect())
        }
    }
}

fn days_to_date(days_since_epoch: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days_since_epoch.checked_add(EPOCH_DAYS_FROM_CE)?)
}
