use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month bucket, displayed as `"YYYY-MM"`.
///
/// Ordering is chronological, which for four-digit years matches the
/// lexicographic order of the displayed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Create a key, returning `None` for a month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key '{}': expected YYYY-MM", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("Invalid year in month key '{}'", s))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("Invalid month in month key '{}'", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("Month out of range in '{}'", s))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let key = MonthKey::new(2024, 3).unwrap();
        assert_eq!(key.to_string(), "2024-03");
        assert_eq!("2024-03".parse::<MonthKey>().unwrap(), key);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_next_rolls_over_year() {
        let december = MonthKey::new(2023, 12).unwrap();
        assert_eq!(december.next().to_string(), "2024-01");
        assert_eq!(MonthKey::new(2024, 1).unwrap().next().to_string(), "2024-02");
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys = vec![
            MonthKey::new(2024, 2).unwrap(),
            MonthKey::new(2023, 11).unwrap(),
            MonthKey::new(2024, 1).unwrap(),
        ];
        keys.sort();
        let shown: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["2023-11", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_serde_as_string() {
        let key = MonthKey::new(2016, 11).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2016-11\"");
        let back: MonthKey = serde_json::from_str("\"2016-11\"").unwrap();
        assert_eq!(back, key);
    }
}
