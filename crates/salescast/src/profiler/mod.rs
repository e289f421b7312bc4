//! Column inference for uploaded tables.
//!
//! This module proposes which columns of an untyped table hold dates and
//! which hold a monetary metric:
//! - Name hints ("Order Date", "Total Revenue")
//! - Value probes (leading values parse as dates, all values parse as numbers)
//! - A per-column [`ColumnKind`](crate::types::ColumnKind) resolved once and
//!   returned as a [`TableSchema`](crate::types::TableSchema)

mod role_inference;
mod type_inference;

use polars::prelude::*;
use tracing::debug;

use crate::types::{ColumnInference, ColumnSchema};

pub(crate) use role_inference::{name_suggests_date, name_suggests_metric};
pub(crate) use type_inference::{is_numeric_column, probe_dates, resolve_kind};

/// Default number of leading values inspected by the date probe.
pub const DEFAULT_DATE_PROBE_SIZE: usize = 5;

/// Proposes date and metric candidate columns for a table.
///
/// - A column is a **date candidate** when its name mentions a date token
///   or its first `probe_size` non-empty values all parse as dates.
/// - A column is a **metric candidate** when its name mentions a metric
///   token *and* its values are numeric, natively or after stripping
///   formatting characters.
///
/// Finding no candidates is a valid result.
#[derive(Debug, Clone, Copy)]
pub struct ColumnInferencer {
    probe_size: usize,
}

impl Default for ColumnInferencer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_PROBE_SIZE)
    }
}

impl ColumnInferencer {
    /// Create an inferencer probing `probe_size` leading values per column.
    pub fn new(probe_size: usize) -> Self {
        Self {
            probe_size: probe_size.max(1),
        }
    }

    /// Infer candidate columns and the column schema of a table.
    pub fn infer(&self, df: &DataFrame) -> ColumnInference {
        let mut inference = ColumnInference::default();

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let name = series.name().to_string();

            let dates_probed = probe_dates(series, self.probe_size).unwrap_or_else(|e| {
                debug!("Date probe failed for '{}': {}", name, e);
                false
            });
            if name_suggests_date(&name) || dates_probed {
                inference.date_candidates.push(name.clone());
            }

            if name_suggests_metric(&name) {
                let numeric = is_numeric_column(series).unwrap_or_else(|e| {
                    debug!("Numeric probe failed for '{}': {}", name, e);
                    false
                });
                if numeric {
                    inference.metric_candidates.push(name.clone());
                }
            }

            let kind = resolve_kind(series, dates_probed);
            inference.schema.columns.push(ColumnSchema { name, kind });
        }

        debug!(
            "Inferred {} date candidate(s) {:?} and {} metric candidate(s) {:?}",
            inference.date_candidates.len(),
            inference.date_candidates,
            inference.metric_candidates.len(),
            inference.metric_candidates
        );

        inference
    }
}
