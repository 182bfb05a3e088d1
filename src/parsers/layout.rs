//! Delimited-file reader shared by the bank parsers

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use std::fs;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{MonthKey, MonthRows, RawRow};

/// How a bank lays out its delimited export
#[derive(Debug, Clone)]
pub struct DelimitedLayout {
    /// Field delimiter
    pub delimiter: u8,
    /// Lines before the header row; blank lines after them are skipped too
    pub preamble_lines: usize,
    /// Header of the column carrying the transaction date
    pub date_column: String,
    /// strftime format of the date column
    pub date_format: String,
}

impl DelimitedLayout {
    pub fn new(delimiter: u8, date_column: &str) -> Self {
        Self {
            delimiter,
            preamble_lines: 0,
            date_column: date_column.to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }

    pub fn with_preamble(mut self, lines: usize) -> Self {
        self.preamble_lines = lines;
        self
    }

    /// Read the rows of `path` dated within `month`
    ///
    /// Exports are not always UTF-8, so undecodable bytes are replaced
    /// rather than rejected. Rows with every cell blank are ignored.
    pub fn read_month(&self, path: &Path, month: MonthKey) -> LedgerResult<MonthRows> {
        let bytes = fs::read(path)
            .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim_start_matches('\u{feff}');

        self.parse_month(text, month)
            .map_err(|e| LedgerError::Parse(format!("{}: {}", path.display(), e)))
    }

    fn parse_month(&self, text: &str, month: MonthKey) -> Result<MonthRows, String> {
        let body: Vec<&str> = text
            .lines()
            .skip(self.preamble_lines)
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let body = body.join("\n");

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| format!("unreadable header: {}", e))?
            .iter()
            .map(str::to_string)
            .collect();

        let date_idx = headers
            .iter()
            .position(|h| h == &self.date_column)
            .ok_or_else(|| format!("missing '{}' column", self.date_column))?;

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| format!("row {}: {}", idx + 1, e))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let cell = record.get(date_idx).unwrap_or("");
            let date = NaiveDate::parse_from_str(cell, &self.date_format)
                .map_err(|_| format!("row {}: could not parse date '{}'", idx + 1, cell))?;

            if month.contains(date) {
                rows.push(RawRow {
                    date,
                    fields: record.iter().map(str::to_string).collect(),
                });
            }
        }

        Ok(MonthRows { headers, rows })
    }
}
