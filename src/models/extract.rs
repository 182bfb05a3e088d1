//! Raw extract files and their coverage claims

use chrono::NaiveDate;
use std::path::PathBuf;

use super::month::MonthKey;

/// A bank export whose covered range was read from its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtractFile {
    pub bank: String,
    pub path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RawExtractFile {
    /// Length of the covered range in days
    pub fn range_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// One candidate per calendar month the range intersects
    pub fn candidates(&self) -> Vec<CoverageCandidate> {
        MonthKey::months_between(self.start_date, self.end_date)
            .into_iter()
            .map(|month| CoverageCandidate::new(self, month))
            .collect()
    }
}

/// One extract's claim to supply the rows of one calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageCandidate {
    pub bank: String,
    pub month: MonthKey,
    pub path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// The extract spans the whole month, first to last day
    pub is_complete: bool,
    pub range_days: i64,
}

impl CoverageCandidate {
    pub fn new(file: &RawExtractFile, month: MonthKey) -> Self {
        Self {
            bank: file.bank.clone(),
            month,
            path: file.path.clone(),
            start_date: file.start_date,
            end_date: file.end_date,
            is_complete: file.start_date <= month.first_day() && file.end_date >= month.last_day(),
            range_days: file.range_days(),
        }
    }
}

/// A row read from a raw extract, keyed by its parsed date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub date: NaiveDate,
    /// Cell values in the extract's own column order
    pub fields: Vec<String>,
}

/// The rows of one month taken from one extract, with the extract's header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthRows {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl MonthRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
