use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Slots in the circular day-of-year domain. Ordinals come from a leap year so
/// every month-day owns the same slot in every year.
pub const YEAR_SLOTS: i32 = 366;

const REFERENCE_LEAP_YEAR: i32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("Invalid month-day '{0}': expected MM-DD")]
    Format(String),

    #[error("Month-day '{0}' does not exist on the calendar")]
    OutOfRange(String),
}

/// A year-agnostic calendar day, written `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, WindowError> {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or_else(|| WindowError::OutOfRange(format!("{:02}-{:02}", month, day)))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { month: date.month(), day: date.day() }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// 1-based position in the 366-slot year.
    pub fn slot(&self) -> i32 {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, self.month, self.day)
            .map(|d| d.ordinal() as i32)
            .unwrap_or(1)
    }

    /// This month-day in a concrete year; `None` for 02-29 outside leap years.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let format_err = || WindowError::Format(s.to_string());

        let (month, day) = trimmed.split_once('-').ok_or_else(format_err)?;
        if month.len() != 2 || day.len() != 2 {
            return Err(format_err());
        }
        let month: u32 = month.parse().map_err(|_| format_err())?;
        let day: u32 = day.parse().map_err(|_| format_err())?;

        Self::new(month, day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = WindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// An inclusive month-day interval recurring every year. `end` before `start`
/// means the window runs across New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringWindow {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl RecurringWindow {
    pub fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    /// Distance from `start` to `end` going forward around the year.
    fn span(&self) -> i32 {
        (self.end.slot() - self.start.slot()).rem_euclid(YEAR_SLOTS)
    }

    pub fn contains_slot(&self, slot: i32) -> bool {
        (slot - self.start.slot()).rem_euclid(YEAR_SLOTS) <= self.span()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.contains_slot(MonthDay::from_date(date).slot())
    }

    pub fn wraps_year_end(&self) -> bool {
        self.end.slot() < self.start.slot()
    }
}

impl fmt::Display for RecurringWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(s: &str) -> MonthDay {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_day() {
        assert_eq!(md("01-06"), MonthDay::new(1, 6).unwrap());
        assert_eq!(md("02-29").slot(), 60);
        assert_eq!(md("12-31").slot(), 366);
        assert_eq!(md("03-01").to_string(), "03-01");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("1-6".parse::<MonthDay>(), Err(WindowError::Format(_))));
        assert!(matches!("01/06".parse::<MonthDay>(), Err(WindowError::Format(_))));
        assert!(matches!("".parse::<MonthDay>(), Err(WindowError::Format(_))));
        assert!(matches!("13-01".parse::<MonthDay>(), Err(WindowError::OutOfRange(_))));
        assert!(matches!("04-31".parse::<MonthDay>(), Err(WindowError::OutOfRange(_))));
    }

    #[test]
    fn test_plain_window_is_inclusive() {
        let window = RecurringWindow::new(md("01-06"), md("01-10"));

        assert!(!window.contains(date(2026, 1, 5)));
        assert!(window.contains(date(2026, 1, 6)));
        assert!(window.contains(date(2026, 1, 8)));
        assert!(window.contains(date(2026, 1, 10)));
        assert!(!window.contains(date(2026, 1, 11)));
        assert!(!window.wraps_year_end());
    }

    #[test]
    fn test_window_wraps_new_year() {
        let window = RecurringWindow::new(md("12-28"), md("01-03"));

        assert!(window.wraps_year_end());
        assert!(window.contains(date(2025, 12, 30)));
        assert!(window.contains(date(2026, 1, 2)));
        assert!(window.contains(date(2026, 12, 31)));
        assert!(!window.contains(date(2026, 1, 4)));
        assert!(!window.contains(date(2026, 12, 27)));
        assert!(!window.contains(date(2026, 6, 15)));
    }

    #[test]
    fn test_single_day_window() {
        let window = RecurringWindow::new(md("07-04"), md("07-04"));

        assert!(window.contains(date(2026, 7, 4)));
        assert!(!window.contains(date(2026, 7, 3)));
        assert!(!window.contains(date(2026, 7, 5)));
    }

    #[test]
    fn test_leap_day_slots_line_up_across_years() {
        let window = RecurringWindow::new(md("02-28"), md("03-01"));

        assert!(window.contains(date(2024, 2, 29)));
        assert!(window.contains(date(2026, 2, 28)));
        assert!(window.contains(date(2026, 3, 1)));
        assert!(!window.contains(date(2026, 3, 2)));
    }

    #[test]
    fn test_month_day_serde_as_string() {
        let value = serde_json::to_value(md("12-28")).unwrap();
        assert_eq!(value, serde_json::json!("12-28"));

        let parsed: MonthDay = serde_json::from_value(serde_json::json!("01-03")).unwrap();
        assert_eq!(parsed, md("01-03"));
        assert!(serde_json::from_value::<MonthDay>(serde_json::json!("1-3")).is_err());
    }
}
