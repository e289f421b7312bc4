//! CSV loading with fallback strategies.
//!
//! Exported spreadsheets are often slightly malformed: stray doubled quotes,
//! blank lines, or non-UTF-8 bytes in free-text columns. Loading tries, in
//! order:
//!
//! 1. Standard parsing with `"` quoting and lossy UTF-8 decoding
//! 2. Parsing without quote handling
//! 3. Reading the file as text, collapsing doubled quotes and blank lines,
//!    then parsing the cleaned content
//!
//! Every column is read as text first. A column is narrowed to `Int64` or
//! `Float64` only when every one of its cells parses, so a stray `N/A` deep
//! in a file leaves that column as text instead of failing the load.
//!
//! A file that none of these can parse is reported as
//! [`AnalyticsError::DataFormat`]; a file that cannot be opened at all is an
//! [`AnalyticsError::Io`].

use polars::io::csv::read::{CsvEncoding, CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AnalyticsError, Result};

/// Load a CSV file into a table.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AnalyticsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Dataset not found: {}", path.display()),
        )));
    }

    let df = narrow_text_columns(load_csv_with_fallbacks(path)?)?;
    info!("Loaded {:?} from {}", df.shape(), path.display());
    Ok(df)
}

fn base_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
}

fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    let quoted = base_options()
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_encoding(CsvEncoding::LossyUtf8),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish();
    match quoted {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    let unquoted = base_options()
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(None)
                .with_encoding(CsvEncoding::LossyUtf8),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish();
    match unquoted {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    warn!("Falling back to pre-cleaned content for {}", path.display());

    parse_csv_str(&clean_csv_content(&content)).map_err(|e| {
        AnalyticsError::DataFormat(format!("Could not parse '{}' as CSV: {}", path.display(), e))
    })
}

/// Parse CSV text that is already in memory.
pub fn parse_csv_str(content: &str) -> PolarsResult<DataFrame> {
    let df = base_options()
        .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
        .finish()?;
    narrow_text_columns(df)
}

/// Give each text column the narrowest numeric dtype all its cells parse as.
fn narrow_text_columns(df: DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let series = column.as_materialized_series();
            if series.dtype() != &DataType::String || series.null_count() == series.len() {
                return column.clone();
            }
            [DataType::Int64, DataType::Float64]
                .iter()
                .find_map(|dtype| series.strict_cast(dtype).ok())
                .map(|narrowed| narrowed.into_column())
                .unwrap_or_else(|| column.clone())
        })
        .collect();
    DataFrame::new(columns)
}

fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_csv_content() {
        let raw = "a,b\n\n\"\"x\"\",1\n   \n\"\"\"y\"\"\",2\n";
        assert_eq!(clean_csv_content(raw), "a,b\n\"x\",1\n\"y\",2");
    }

    #[test]
    fn test_parse_csv_str() {
        let df = parse_csv_str("Order Date,Sales\n2024-01-05,\"$1,200.50\"\n2024-02-01,300\n").unwrap();
        assert_eq!(df.shape(), (2, 2));
        let sales = df.column("Sales").unwrap();
        assert_eq!(sales.dtype(), &DataType::String);
    }

    #[test]
    fn test_numeric_columns_are_narrowed() {
        let df = parse_csv_str("Row ID,Price,Name\n1,1.5,a\n2,,b\n").unwrap();
        assert_eq!(df.column("Row ID").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Name").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_late_malformed_cell_keeps_column_as_text() {
        let mut content = String::from("Order Date,Sales\n");
        for i in 0..150 {
            content.push_str(&format!("2024-{:02}-01,10\n", i % 12 + 1));
        }
        content.push_str("2024-01-02,N/A\n2024-01-03,\"$1,200.50\"\n");

        let df = parse_csv_str(&content).unwrap();
        assert_eq!(df.height(), 152);
        let sales = df.column("Sales").unwrap();
        assert_eq!(sales.dtype(), &DataType::String);
        assert_eq!(sales.get(151).unwrap(), AnyValue::String("$1,200.50"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_csv("does/not/exist.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!err.is_client_error());
    }
}
