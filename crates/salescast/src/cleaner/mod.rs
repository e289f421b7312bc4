//! Cell-level cleaning for untyped columns.
//!
//! This module turns raw cells into typed values:
//! - [`NumericCoercer`] converts a column to numbers, nulling cells that
//!   cannot be read as a number
//! - [`parse_date_column`] converts a column to calendar dates, nulling
//!   cells that cannot be read as a date
//!
//! Neither step ever fails on an individual cell. Aggregators drop rows whose
//! coerced value is null.

mod dates;
mod numeric;

pub use dates::{parse_date_column, parse_date_str};
pub use numeric::NumericCoercer;
