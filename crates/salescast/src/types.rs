use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{DtypeCategory, get_dtype_category};

/// Logical kind of a column, resolved once per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, or numbers still wrapped in formatting ("$1,200.50").
    Text,
    /// Natively numeric cells.
    Number,
    /// Native date/datetime cells, or text that passed the date probe.
    Date,
}

impl ColumnKind {
    /// Kind implied by the physical dtype alone, without probing values.
    pub fn of_series(series: &Series) -> Self {
        match get_dtype_category(series.dtype()) {
            DtypeCategory::Numeric => Self::Number,
            DtypeCategory::Datetime => Self::Date,
            DtypeCategory::String | DtypeCategory::Other => Self::Text,
        }
    }
}

/// One column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

/// Per-column kind descriptor for a table, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Kind of a named column, if the schema describes it.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|col| col.name == name)
            .map(|col| col.kind)
    }

    /// Column names in table order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }
}

/// Candidate date and metric columns proposed for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInference {
    pub date_candidates: Vec<String>,
    pub metric_candidates: Vec<String>,
    pub schema: TableSchema,
}

impl ColumnInference {
    /// True when both candidate sets hold exactly one column, so the caller
    /// can pick them without asking.
    pub fn is_unambiguous(&self) -> bool {
        self.date_candidates.len() == 1 && self.metric_candidates.len() == 1
    }
}
