//! Nubank account exports
//!
//! Filenames look like `NU_<id>_01JAN2023_31JAN2023.csv`, with Portuguese
//! month abbreviations. The `<id>` segment is optional; only the last two
//! tokens carry the range. The file is a plain comma-separated table with a
//! `Data` column in `dd/mm/YYYY`.

use chrono::NaiveDate;
use std::path::Path;

use super::{DelimitedLayout, ExtractParser};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{MonthKey, MonthRows};

const PT_MONTHS: [&str; 12] = [
    "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
];

pub struct NubankParser {
    layout: DelimitedLayout,
}

impl NubankParser {
    pub fn new() -> Self {
        Self {
            layout: DelimitedLayout::new(b',', "Data"),
        }
    }
}

impl Default for NubankParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `DDMMMYYYY` token such as `05FEV2023`
fn parse_token(token: &str) -> Option<NaiveDate> {
    if token.len() != 9 || !token.is_ascii() {
        return None;
    }
    let day: u32 = token.get(0..2)?.parse().ok()?;
    let abbrev = token.get(2..5)?.to_ascii_uppercase();
    let month = PT_MONTHS.iter().position(|m| *m == abbrev)? as u32 + 1;
    let year: i32 = token.get(5..9)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

impl ExtractParser for NubankParser {
    fn bank(&self) -> &str {
        "nubank"
    }

    fn can_parse(&self, filename: &str) -> bool {
        filename.starts_with("NU_") && filename.ends_with(".csv")
    }

    fn parse_range(&self, filename: &str) -> LedgerResult<(NaiveDate, NaiveDate)> {
        let invalid = || LedgerError::Parse(format!("not a Nubank extract name: {}", filename));

        let stem = filename.strip_suffix(".csv").ok_or_else(invalid)?;
        let tokens: Vec<&str> = stem.split('_').collect();
        if tokens.len() < 3 {
            return Err(invalid());
        }

        let start = parse_token(tokens[tokens.len() - 2]).ok_or_else(invalid)?;
        let end = parse_token(tokens[tokens.len() - 1]).ok_or_else(invalid)?;
        Ok((start, end))
    }

    fn read_month(&self, path: &Path, month: MonthKey) -> LedgerResult<MonthRows> {
        self.layout.read_month(path, month)
    }
}
