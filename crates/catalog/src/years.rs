//! Year labels and the date ranges they select.

use crate::error::{CatalogError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The label shown in a year dropdown, e.g. `"2016"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearLabel(String);

impl YearLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for YearLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| CatalogError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Half-open calendar range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(CatalogError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start inclusive, end exclusive
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Ordered `YearLabel → DateRange` association.
///
/// Lookups go by label only; nothing is inferred from the label's digits.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    entries: Vec<(YearLabel, DateRange)>,
}

impl YearTable {
    /// Fails on an empty table or a duplicated label.
    pub fn new(entries: Vec<(YearLabel, DateRange)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CatalogError::InvalidYearTable("no years configured".into()));
        }
        for (i, (label, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(l, _)| l == label) {
                return Err(CatalogError::InvalidYearTable(format!(
                    "duplicate year label '{}'",
                    label
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, label: &YearLabel) -> Option<&DateRange> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, r)| r)
    }

    /// Look up a label, failing with [`CatalogError::UnknownYear`]
    pub fn resolve(&self, label: &str) -> Result<(&YearLabel, &DateRange)> {
        self.entries
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(l, r)| (l, r))
            .ok_or_else(|| CatalogError::UnknownYear(label.to_string()))
    }

    /// Labels in dropdown order
    pub fn labels(&self) -> impl Iterator<Item = &YearLabel> {
        self.entries.iter().map(|(l, _)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearLabel, &DateRange)> {
        self.entries.iter().map(|(l, r)| (l, r))
    }

    pub fn first(&self) -> &YearLabel {
        &self.entries[0].0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn range_is_half_open() {
        let r = DateRange::parse("2023-01-01", "2023-10-30").unwrap();
        assert!(r.contains(d("2023-01-01")));
        assert!(r.contains(d("2023-10-29")));
        assert!(!r.contains(d("2023-10-30")));
        assert!(!r.contains(d("2022-12-31")));
    }

    #[test]
    fn range_rejects_empty_or_reversed() {
        assert!(DateRange::parse("2023-01-01", "2023-01-01").is_err());
        assert!(DateRange::parse("2023-02-01", "2023-01-01").is_err());
        assert!(matches!(
            DateRange::parse("2023-13-01", "2024-01-01"),
            Err(CatalogError::InvalidDate { .. })
        ));
    }

    #[test]
    fn table_lookup_by_label() {
        let table = YearTable::new(vec![
            ("2016".into(), DateRange::parse("2023-01-01", "2023-10-30").unwrap()),
            ("2017".into(), DateRange::parse("2022-01-01", "2022-12-30").unwrap()),
        ])
        .unwrap();

        let r = table.get(&"2016".into()).unwrap();
        assert_eq!(r.start(), d("2023-01-01"));
        assert_eq!(r.end(), d("2023-10-30"));
        assert_eq!(table.first().as_str(), "2016");
        assert!(table.resolve("1999").is_err());
        assert_eq!(table.labels().count(), 2);
    }

    #[test]
    fn table_rejects_duplicates_and_empty() {
        let r = DateRange::parse("2023-01-01", "2023-10-30").unwrap();
        assert!(YearTable::new(vec![("a".into(), r), ("a".into(), r)]).is_err());
        assert!(YearTable::new(vec![]).is_err());
    }
}
