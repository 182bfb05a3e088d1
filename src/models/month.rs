//! Calendar month keys
//!
//! A `MonthKey` names one calendar month in `YYYY-MM` form. It is the unit of
//! coverage selection, batch files and ground-truth checkpoints.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Create a month key, returning None for an invalid month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Last calendar day of the month (inclusive)
    pub fn last_day(&self) -> NaiveDate {
        self.next().0 - Days::new(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// The following month
    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    /// Every month intersected by the inclusive range `[start, end]`, ascending
    ///
    /// Returns an empty list when `end` precedes `start`.
    pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<MonthKey> {
        let mut months = Vec::new();
        if end < start {
            return months;
        }
        let last = MonthKey::from_date(end);
        let mut current = MonthKey::from_date(start);
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }

    /// Months strictly between `self` and `other` (both exclusive)
    pub fn months_until(&self, other: MonthKey) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut current = self.next();
        while current < other {
            months.push(current);
            current = current.next();
        }
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = MonthParseError;

    /// Parse a `YYYY-MM` key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error for a malformed `YYYY-MM` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid month key (expected YYYY-MM): '{}'", self.0)
    }
}

impl std::error::Error for MonthParseError {}
