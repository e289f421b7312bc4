//! Value probes used to type columns.

use polars::prelude::*;

use crate::cleaner::{NumericCoercer, parse_date_str};
use crate::types::ColumnKind;
use crate::utils::{is_datetime_dtype, is_numeric_dtype, leading_text_values};

/// Check whether the leading values of a column all read as dates.
///
/// Native date columns always pass and native numeric columns never do.
/// Otherwise the first `probe_size` non-empty values are parsed; a single
/// failure, or having nothing to parse, rejects the column.
pub(crate) fn probe_dates(series: &Series, probe_size: usize) -> PolarsResult<bool> {
    let dtype = series.dtype();
    if is_datetime_dtype(dtype) {
        return Ok(true);
    }
    if is_numeric_dtype(dtype) {
        return Ok(false);
    }

    let samples = leading_text_values(series, probe_size)?;
    Ok(!samples.is_empty() && samples.iter().all(|s| parse_date_str(s).is_some()))
}

/// Check whether a column is numeric, either natively or after stripping
/// formatting characters from every cell.
pub(crate) fn is_numeric_column(series: &Series) -> PolarsResult<bool> {
    NumericCoercer::is_fully_numeric(series)
}

/// Resolve the kind of a column once, given the outcome of the date probe.
pub(crate) fn resolve_kind(series: &Series, dates_probed: bool) -> ColumnKind {
    match ColumnKind::of_series(series) {
        ColumnKind::Text if dates_probed => ColumnKind::Date,
        kind => kind,
    }
}
