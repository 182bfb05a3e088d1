//! Monthly batch files
//!
//! Batches are named `<bank>_<YYYY-MM>.<ext>`. The resolver writes raw month
//! slices under this naming and the reconciler reads normalized batches back
//! from it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::file_io;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{MonthKey, MonthRows, MonthlyBatch, Transaction};

/// File name of a bank's batch for a month
pub fn batch_file_name(bank: &str, month: MonthKey, extension: &str) -> String {
    format!("{}_{}.{}", bank, month, extension)
}

/// Split a batch file name into bank and month
///
/// The bank is everything before the last `_`, so bank names may contain
/// underscores themselves.
pub fn parse_batch_name(filename: &str, extension: &str) -> Option<(String, MonthKey)> {
    let stem = filename.strip_suffix(extension)?.strip_suffix('.')?;
    let (bank, month) = stem.rsplit_once('_')?;
    if bank.is_empty() {
        return None;
    }
    let month = month.parse().ok()?;
    Some((bank.to_string(), month))
}

/// Batch files found in a directory, grouped by bank
#[derive(Debug, Clone, Default)]
pub struct BatchIndex {
    pub banks: BTreeMap<String, BTreeMap<MonthKey, PathBuf>>,
    /// Files that do not follow the batch naming
    pub skipped: Vec<PathBuf>,
}

impl BatchIndex {
    /// Months missing between a bank's first and last batch
    pub fn gaps(&self, bank: &str) -> Vec<MonthKey> {
        let months = match self.banks.get(bank) {
            Some(months) => months,
            None => return Vec::new(),
        };

        let keys: Vec<MonthKey> = months.keys().copied().collect();
        keys.windows(2)
            .flat_map(|pair| pair[0].months_until(pair[1]))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

/// Index the batch files directly inside `dir`
pub fn discover(dir: &Path, extension: &str) -> LedgerResult<BatchIndex> {
    let mut index = BatchIndex::default();

    for path in file_io::list_files(dir)? {
        let parsed = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| parse_batch_name(name, extension));

        match parsed {
            Some((bank, month)) => {
                index.banks.entry(bank).or_default().insert(month, path);
            }
            None => {
                warn!(path = %path.display(), "Not a <bank>_<YYYY-MM> batch file; skipping");
                index.skipped.push(path);
            }
        }
    }

    Ok(index)
}

/// Read a normalized batch file
pub fn read_batch(month: MonthKey, path: &Path) -> LedgerResult<MonthlyBatch> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        LedgerError::Csv(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut transactions = Vec::new();
    for (idx, record) in reader.deserialize::<Transaction>().enumerate() {
        let txn = record.map_err(|e| {
            LedgerError::Csv(format!("{} row {}: {}", path.display(), idx + 1, e))
        })?;
        transactions.push(txn);
    }

    Ok(MonthlyBatch::new(month, transactions))
}

/// Write one month's raw rows, keeping the extract's own header
pub fn write_month_slice(
    dir: &Path,
    bank: &str,
    month: MonthKey,
    rows: &MonthRows,
) -> LedgerResult<PathBuf> {
    let path = dir.join(batch_file_name(bank, month, "csv"));
    let records: Vec<Vec<String>> = rows.rows.iter().map(|r| r.fields.clone()).collect();
    file_io::write_records_atomic(&path, &rows.headers, &records)?;
    Ok(path)
}
