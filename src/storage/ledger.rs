//! Consolidated ledger files
//!
//! One file per bank named `<bank>_<first-date>_<last-date>.<ext>`, holding
//! the reconciled sequence in order.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::file_io;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Ledger;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// File name of a bank's ledger spanning `first..=last`
pub fn ledger_file_name(bank: &str, first: NaiveDate, last: NaiveDate, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        bank,
        first.format(DATE_FORMAT),
        last.format(DATE_FORMAT),
        extension
    )
}

/// Split a ledger file name into bank and covered span
pub fn parse_ledger_name(filename: &str, extension: &str) -> Option<(String, NaiveDate, NaiveDate)> {
    let stem = filename.strip_suffix(extension)?.strip_suffix('.')?;
    let (rest, last) = stem.rsplit_once('_')?;
    let (bank, first) = rest.rsplit_once('_')?;
    if bank.is_empty() {
        return None;
    }
    let first = NaiveDate::parse_from_str(first, DATE_FORMAT).ok()?;
    let last = NaiveDate::parse_from_str(last, DATE_FORMAT).ok()?;
    Some((bank.to_string(), first, last))
}

/// Writes reconciled ledgers atomically
pub struct ConsolidatedWriter {
    extension: String,
}

impl ConsolidatedWriter {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Write `ledger` into `output_dir` and return the final path
    ///
    /// The file only appears under its final name once fully written.
    pub fn write(&self, bank: &str, ledger: &Ledger, output_dir: &Path) -> LedgerResult<PathBuf> {
        if ledger.bank != bank {
            return Err(LedgerError::Validation(format!(
                "ledger of '{}' cannot be written as '{}'",
                ledger.bank, bank
            )));
        }

        let (first, last) = match (ledger.first_date(), ledger.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(LedgerError::Validation(format!(
                    "ledger of '{}' has no entries",
                    bank
                )))
            }
        };

        let path = output_dir.join(ledger_file_name(bank, first, last, &self.extension));
        file_io::write_csv_atomic(&path, &ledger.entries)?;

        info!(bank, path = %path.display(), entries = ledger.len(), "Wrote ledger");
        Ok(path)
    }

    /// Remove `bank`'s ledgers in `output_dir` other than `keep`
    ///
    /// Returns the removed paths.
    pub fn prune_older(&self, bank: &str, output_dir: &Path, keep: &Path) -> LedgerResult<Vec<PathBuf>> {
        let mut removed = Vec::new();

        for path in file_io::list_files(output_dir)? {
            if path == keep {
                continue;
            }
            let owned_by_bank = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| parse_ledger_name(name, &self.extension))
                .map(|(owner, _, _)| owner == bank)
                .unwrap_or(false);

            if owned_by_bank {
                fs::remove_file(&path).map_err(|e| {
                    LedgerError::Storage(format!("Failed to remove {}: {}", path.display(), e))
                })?;
                debug!(bank, path = %path.display(), "Removed superseded ledger");
                removed.push(path);
            }
        }

        Ok(removed)
    }
}

impl Default for ConsolidatedWriter {
    fn default() -> Self {
        Self::new("csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Transaction};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new("x");
        ledger
            .entries
            .push(Transaction::initial_balance(date(2023, 1, 10), "x", Money::from_units(100)));
        let mut row = Transaction::new(date(2023, 1, 10), "x", Money::from_units(50), Money::from_units(30));
        row.balance = Money::from_units(120);
        row.original_id = "abc".into();
        ledger.entries.push(row);
        ledger.entries.push(Transaction::reconciler_adjustment(
            date(2023, 2, 3),
            "x",
            Money::from_units(120),
            Some(Money::from_units(150)),
        ).unwrap());
        ledger
    }

    #[test]
    fn test_ledger_name_round_trip() {
        let name = ledger_file_name("my_bank", date(2023, 1, 2), date(2023, 3, 31), "csv");
        assert_eq!(name, "my_bank_2023-01-02_2023-03-31.csv");
        assert_eq!(
            parse_ledger_name(&name, "csv"),
            Some(("my_bank".to_string(), date(2023, 1, 2), date(2023, 3, 31)))
        );
        assert_eq!(parse_ledger_name("my_bank_2023-01.csv", "csv"), None);
    }

    #[test]
    fn test_write_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ConsolidatedWriter::default();

        let path = writer.write("x", &sample_ledger(), temp_dir.path()).unwrap();
        assert_eq!(path, temp_dir.path().join("x_2023-01-10_2023-02-03.csv"));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "date,bank,income,outcome,balance,category,description,original_id,participant"
        );
        assert_eq!(lines[1], "2023-01-10,x,100.00,0.00,100.00,initial-balance,,,");
        assert_eq!(lines[2], "2023-01-10,x,50.00,30.00,120.00,,,abc,");
        assert_eq!(lines[3], "2023-02-03,x,30.00,0.00,150.00,reconciler-adjustment,,,");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_rejects_empty_or_foreign_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ConsolidatedWriter::default();
        assert!(writer.write("x", &Ledger::new("x"), temp_dir.path()).is_err());
        assert!(writer.write("y", &sample_ledger(), temp_dir.path()).is_err());
    }

    #[test]
    fn test_prune_older() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for name in [
            "x_2022-01-01_2022-12-31.csv",
            "x_2023-01-10_2023-02-03.csv",
            "x_y_2022-01-01_2022-12-31.csv",
            "notes.csv",
        ] {
            fs::write(dir.join(name), "").unwrap();
        }

        let writer = ConsolidatedWriter::default();
        let removed = writer
            .prune_older("x", dir, &dir.join("x_2023-01-10_2023-02-03.csv"))
            .unwrap();

        assert_eq!(removed, vec![dir.join("x_2022-01-01_2022-12-31.csv")]);
        assert!(dir.join("x_y_2022-01-01_2022-12-31.csv").exists());
        assert!(dir.join("notes.csv").exists());
    }
}
