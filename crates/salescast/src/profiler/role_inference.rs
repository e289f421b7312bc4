//! Name-based role hints for column analysis.

/// Name fragments that mark a column as holding dates.
const DATE_NAME_TOKENS: [&str; 5] = ["date", "time", "day", "month", "year"];

/// Name fragments that mark a column as holding a monetary metric.
const METRIC_NAME_TOKENS: [&str; 6] = ["sales", "revenue", "amount", "price", "total", "value"];

/// Check whether a column name suggests a date, case-insensitively.
pub(crate) fn name_suggests_date(col_name: &str) -> bool {
    let lower = col_name.to_lowercase();
    DATE_NAME_TOKENS.iter().any(|token| lower.contains(token))
}

/// Check whether a column name suggests a monetary metric, case-insensitively.
pub(crate) fn name_suggests_metric(col_name: &str) -> bool {
    let lower = col_name.to_lowercase();
    METRIC_NAME_TOKENS.iter().any(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_names() {
        assert!(name_suggests_date("Order Date"));
        assert!(name_suggests_date("TIMESTAMP"));
        assert!(name_suggests_date("ship_day"));
        assert!(name_suggests_date("Fiscal Year"));
        assert!(!name_suggests_date("Region"));
    }

    #[test]
    fn test_metric_names() {
        assert!(name_suggests_metric("Sales"));
        assert!(name_suggests_metric("net_revenue"));
        assert!(name_suggests_metric("Unit Price"));
        assert!(name_suggests_metric("TOTAL"));
        assert!(!name_suggests_metric("Profit"));
        assert!(!name_suggests_metric("Quantity"));
    }
}
