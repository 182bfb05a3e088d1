//! Banco Inter account exports
//!
//! Filenames look like `Extrato-01-01-2023-a-31-01-2023.csv`. The file opens
//! with a three-line preamble, then a `;`-separated table whose
//! `Data Lançamento` column is in `dd/mm/YYYY` and whose amounts use decimal
//! commas.

use chrono::NaiveDate;
use std::path::Path;

use super::{DelimitedLayout, ExtractParser};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{MonthKey, MonthRows};

pub struct InterParser {
    layout: DelimitedLayout,
}

impl InterParser {
    pub fn new() -> Self {
        Self {
            layout: DelimitedLayout::new(b';', "Data Lançamento").with_preamble(3),
        }
    }
}

impl Default for InterParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    if day.len() != 2 || month.len() != 2 || year.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

impl ExtractParser for InterParser {
    fn bank(&self) -> &str {
        "inter"
    }

    fn can_parse(&self, filename: &str) -> bool {
        filename.starts_with("Extrato-") && filename.ends_with(".csv")
    }

    fn parse_range(&self, filename: &str) -> LedgerResult<(NaiveDate, NaiveDate)> {
        let invalid = || LedgerError::Parse(format!("not an Inter extract name: {}", filename));

        let stem = filename.strip_suffix(".csv").ok_or_else(invalid)?;
        let parts: Vec<&str> = stem.split('-').collect();
        // Extrato, DD, MM, YYYY, a, DD, MM, YYYY
        if parts.len() != 8 || parts[4] != "a" {
            return Err(invalid());
        }

        let start = parse_date(parts[1], parts[2], parts[3]).ok_or_else(invalid)?;
        let end = parse_date(parts[5], parts[6], parts[7]).ok_or_else(invalid)?;
        Ok((start, end))
    }

    fn read_month(&self, path: &Path, month: MonthKey) -> LedgerResult<MonthRows> {
        self.layout.read_month(path, month)
    }
}
