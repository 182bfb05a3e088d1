//! Ground-truth balances file

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::models::GroundTruthBalances;

/// Load the balances mapping
///
/// A missing file is an empty mapping. An unreadable mapping is a
/// `GroundTruth` error, which the run reports against every bank; failing to
/// read an existing file is an `Io` error.
pub fn load_ground_truth(path: &Path) -> LedgerResult<GroundTruthBalances> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "No balances file; every month reconciles without a checkpoint");
            return Ok(GroundTruthBalances::new());
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(LedgerError::GroundTruth(format!(
                "{} is not valid UTF-8",
                path.display()
            )))
        }
        Err(e) => {
            return Err(LedgerError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    GroundTruthBalances::from_json_str(&contents)
}
