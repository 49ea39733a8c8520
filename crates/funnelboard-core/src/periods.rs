use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};
use thiserror::Error;

use funnelboard_parser::LeadRecord;

/// Label of the "no filter" entry in the period selector.
pub const ALL_PERIODS_LABEL: &str = "Todos os Períodos";

/// Query-string value that selects every period.
pub const ALL_PERIODS_PARAM: &str = "all";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid period '{0}', expected YYYY-MM")]
pub struct PeriodParseError(pub String);

/// A signup month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_datetime(value: &NaiveDateTime) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
        }
    }

    /// Period of a record, if its signup date is known.
    pub fn of(record: &LeadRecord) -> Option<Self> {
        record.signup_date.as_ref().map(Self::from_datetime)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || PeriodParseError(trimmed.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        PeriodKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Period chosen in the dashboard selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PeriodSelection {
    #[default]
    All,
    Month(PeriodKey),
}

impl PeriodSelection {
    /// Reads the `period` query parameter; missing, empty and `all` select everything.
    pub fn from_query(value: Option<&str>) -> Result<Self, PeriodParseError> {
        match value.map(str::trim) {
            None | Some("") => Ok(PeriodSelection::All),
            Some(value) if value.eq_ignore_ascii_case(ALL_PERIODS_PARAM) => {
                Ok(PeriodSelection::All)
            }
            Some(value) => value.parse().map(PeriodSelection::Month),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PeriodSelection::All => ALL_PERIODS_LABEL.to_string(),
            PeriodSelection::Month(key) => key.to_string(),
        }
    }

    pub fn query_value(&self) -> String {
        match self {
            PeriodSelection::All => ALL_PERIODS_PARAM.to_string(),
            PeriodSelection::Month(key) => key.to_string(),
        }
    }

    pub fn matches(&self, record: &LeadRecord) -> bool {
        match self {
            PeriodSelection::All => true,
            PeriodSelection::Month(key) => PeriodKey::of(record).as_ref() == Some(key),
        }
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for PeriodSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.query_value())
    }
}

/// Selector options: `All` first, then every signup month, newest first.
pub fn derive_periods<'a, I>(records: I) -> Vec<PeriodSelection>
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let months: BTreeSet<PeriodKey> = records.into_iter().filter_map(PeriodKey::of).collect();

    std::iter::once(PeriodSelection::All)
        .chain(months.into_iter().rev().map(PeriodSelection::Month))
        .collect()
}

/// Records belonging to `selection`. Records without a signup date only
/// survive the `All` selection.
pub fn filter_by_period<'a>(
    records: &'a [LeadRecord],
    selection: &PeriodSelection,
) -> Vec<&'a LeadRecord> {
    records
        .iter()
        .filter(|record| selection.matches(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_keys_round_trip_through_text() {
        let key: PeriodKey = "2024-03".parse().expect("parse");
        assert_eq!(key, PeriodKey::new(2024, 3).expect("key"));
        assert_eq!(key.to_string(), "2024-03");

        for bad in ["2024-13", "2024-3", "24-03", "2024/03", "march"] {
            assert!(bad.parse::<PeriodKey>().is_err(), "{bad}");
        }
    }

    #[test]
    fn query_values_select_periods() {
        assert_eq!(PeriodSelection::from_query(None), Ok(PeriodSelection::All));
        assert_eq!(PeriodSelection::from_query(Some("")), Ok(PeriodSelection::All));
        assert_eq!(PeriodSelection::from_query(Some("ALL")), Ok(PeriodSelection::All));
        assert_eq!(
            PeriodSelection::from_query(Some("2023-11")),
            Ok(PeriodSelection::Month(PeriodKey::new(2023, 11).expect("key")))
        );
        assert!(PeriodSelection::from_query(Some("nope")).is_err());
    }

    #[test]
    fn keys_order_chronologically() {
        let older = PeriodKey::new(2023, 12).expect("key");
        let newer = PeriodKey::new(2024, 1).expect("key");
        assert!(older < newer);
    }
}
