//! Calendar month identifiers (`YYYY-MM`) and the arithmetic around them.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::time::Clock;
use crate::errors::{Result, TrackerError};

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("month pattern compiles"));

/// A calendar month, serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(TrackerError::validation(format!(
                "year {} is outside 0000-9999",
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(TrackerError::validation(format!(
                "month {} is outside 01-12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`, clamped to `0000-01..=9999-12`.
    pub fn of_date(date: NaiveDate) -> Self {
        match date.year() {
            year if year < MIN_YEAR => Self {
                year: MIN_YEAR,
                month: 1,
            },
            year if year > MAX_YEAR => Self {
                year: MAX_YEAR,
                month: 12,
            },
            year => Self {
                year,
                month: date.month(),
            },
        }
    }

    /// The month containing the clock's current date.
    pub fn current(clock: &dyn Clock) -> Self {
        Self::of_date(clock.today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month before, or `None` at `0000-01`.
    pub fn previous(&self) -> Option<Self> {
        self.shift(-1)
    }

    /// The month after, or `None` at `9999-12`.
    pub fn next(&self) -> Option<Self> {
        self.shift(1)
    }

    /// Moves by `delta` calendar months, carrying into the year as needed.
    /// Returns `None` when the result would leave `0000-01..=9999-12`.
    pub fn shift(&self, delta: i32) -> Option<Self> {
        let index = (self.year * 12 + (self.month as i32 - 1)).checked_add(delta)?;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1).ok()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Human-readable label such as `January 2024`.
    pub fn label(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|value| chrono::Month::try_from(value).ok())
            .map(|month| month.name())
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }

    /// Up to `count` consecutive months ending at (and including) `self`,
    /// oldest first. Months before `0000-01` are left out.
    pub fn trailing(&self, count: usize) -> Vec<Month> {
        (0..count)
            .rev()
            .filter_map(|offset| i32::try_from(offset).ok())
            .filter_map(|offset| self.shift(-offset))
            .collect()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if !MONTH_PATTERN.is_match(trimmed) {
            return Err(TrackerError::validation(format!(
                "invalid month `{}` (expected YYYY-MM)",
                value
            )));
        }
        let (year, month) = trimmed.split_at(4);
        let year: i32 = year
            .parse()
            .map_err(|_| TrackerError::validation(format!("invalid year in `{}`", value)))?;
        let month: u32 = month[1..]
            .parse()
            .map_err(|_| TrackerError::validation(format!("invalid month in `{}`", value)))?;
        Month::new(year, month)
    }
}

impl TryFrom<String> for Month {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

/// The current month according to `clock`.
pub fn current_month(clock: &dyn Clock) -> Month {
    Month::current(clock)
}

/// One month before `month`, or before the current month when `None`.
pub fn previous_month(clock: &dyn Clock, month: Option<Month>) -> Option<Month> {
    month.unwrap_or_else(|| Month::current(clock)).previous()
}

/// One month after `month`, or after the current month when `None`.
pub fn next_month(clock: &dyn Clock, month: Option<Month>) -> Option<Month> {
    month.unwrap_or_else(|| Month::current(clock)).next()
}

pub fn format_month(month: &Month) -> String {
    month.label()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;

    fn month(value: &str) -> Month {
        value.parse().expect("valid month")
    }

    #[test]
    fn crosses_year_boundaries() {
        assert_eq!(month("2024-12").next(), Some(month("2025-01")));
        assert_eq!(month("2024-01").previous(), Some(month("2023-12")));
        assert_eq!(month("2024-03").shift(-15), Some(month("2022-12")));
        assert_eq!(month("2024-03").shift(22), Some(month("2026-01")));
    }

    #[test]
    fn next_and_previous_round_trip() {
        let mut cursor = month("2019-01");
        for _ in 0..48 {
            assert_eq!(cursor.previous().and_then(|m| m.next()), Some(cursor));
            assert_eq!(cursor.next().and_then(|m| m.previous()), Some(cursor));
            cursor = cursor.next().unwrap();
        }
    }

    #[test]
    fn stays_within_four_digit_years() {
        assert_eq!(month("9999-12").next(), None);
        assert_eq!(month("0000-01").previous(), None);
        assert_eq!(month("9999-11").next(), Some(month("9999-12")));
        assert_eq!(month("2024-01").shift(i32::MAX), None);

        let early: Vec<String> = month("0000-02").trailing(4).iter().map(Month::to_string).collect();
        assert_eq!(early, vec!["0000-01", "0000-02"]);

        let far = NaiveDate::from_ymd_opt(12000, 6, 1).unwrap();
        assert_eq!(Month::of_date(far), month("9999-12"));
    }

    #[test]
    fn formats_long_labels() {
        assert_eq!(format_month(&month("2024-01")), "January 2024");
        assert_eq!(month("1999-12").label(), "December 1999");
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["2024-1", "24-01", "2024-13", "2024-00", "2024/01", "", "abcd-ef"] {
            let err = bad.parse::<Month>().expect_err(bad);
            assert!(matches!(err, TrackerError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn defaults_to_clock_month_when_unspecified() {
        let clock = FixedClock::at_date(2024, 1, 15);
        assert_eq!(current_month(&clock).to_string(), "2024-01");
        assert_eq!(previous_month(&clock, None), Some(month("2023-12")));
        assert_eq!(next_month(&clock, None), Some(month("2024-02")));
        assert_eq!(
            next_month(&clock, Some(month("2024-12"))),
            Some(month("2025-01"))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&month("2024-05")).unwrap();
        assert_eq!(json, "\"2024-05\"");
        let parsed: Month = serde_json::from_str("\"2023-11\"").unwrap();
        assert_eq!(parsed, month("2023-11"));
        assert!(serde_json::from_str::<Month>("\"2023-1\"").is_err());
    }

    #[test]
    fn trailing_lists_oldest_first() {
        let months: Vec<String> = month("2024-02")
            .trailing(3)
            .iter()
            .map(Month::to_string)
            .collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn contains_matches_calendar_dates() {
        let feb = month("2024-02");
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
