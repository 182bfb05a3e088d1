//! Staged ledger publication
//!
//! A run writes its ledgers into a hidden sibling of the output directory and
//! moves them into place once every bank has been processed, so no ledger is
//! visible in the output directory while the run is still writing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ledger::ConsolidatedWriter;
use crate::error::{LedgerError, LedgerResult};

/// A staging directory bound to the output directory it publishes into
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    target: PathBuf,
}

impl StagingArea {
    /// Staging directory used for `target`: `.<name>.staging` beside it
    pub fn staging_dir_for(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("output");
        let staging_name = format!(".{}.staging", name);
        match target.parent() {
            Some(parent) => parent.join(staging_name),
            None => PathBuf::from(staging_name),
        }
    }

    /// Create a fresh staging directory, clearing leftovers of an aborted run
    pub fn create(target: &Path) -> LedgerResult<Self> {
        let root = Self::staging_dir_for(target);

        if root.exists() {
            debug!(path = %root.display(), "Removing stale staging directory");
            fs::remove_dir_all(&root).map_err(|e| {
                LedgerError::Storage(format!("Failed to clear {}: {}", root.display(), e))
            })?;
        }

        fs::create_dir_all(&root).map_err(|e| {
            LedgerError::Storage(format!("Failed to create {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            target: target.to_path_buf(),
        })
    }

    /// Directory ledgers are written into during the run
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Move staged ledgers into the output directory
    ///
    /// Each `(bank, staged_path)` is renamed into place, then the bank's
    /// ledgers with other spans are removed. Banks not listed are left alone.
    pub fn publish(
        self,
        staged: &[(String, PathBuf)],
        writer: &ConsolidatedWriter,
    ) -> LedgerResult<Vec<(String, PathBuf)>> {
        fs::create_dir_all(&self.target).map_err(|e| {
            LedgerError::Storage(format!("Failed to create {}: {}", self.target.display(), e))
        })?;

        let mut published = Vec::with_capacity(staged.len());
        for (bank, staged_path) in staged {
            let file_name = staged_path.file_name().ok_or_else(|| {
                LedgerError::Storage(format!("Staged path has no file name: {}", staged_path.display()))
            })?;
            let dest = self.target.join(file_name);

            fs::rename(staged_path, &dest).map_err(|e| {
                LedgerError::Storage(format!(
                    "Failed to publish {} to {}: {}",
                    staged_path.display(),
                    dest.display(),
                    e
                ))
            })?;
            writer.prune_older(bank, &self.target, &dest)?;

            info!(bank = %bank, path = %dest.display(), "Published ledger");
            published.push((bank.clone(), dest));
        }

        self.discard()?;
        Ok(published)
    }

    /// Remove the staging directory and everything in it
    pub fn discard(self) -> LedgerResult<()> {
        fs::remove_dir_all(&self.root).map_err(|e| {
            LedgerError::Storage(format!("Failed to remove {}: {}", self.root.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_dir_is_hidden_sibling() {
        let dir = StagingArea::staging_dir_for(Path::new("/data/03--reconciled"));
        assert_eq!(dir, PathBuf::from("/data/.03--reconciled.staging"));
    }

    #[test]
    fn test_publish_moves_and_prunes() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("x_2022-01-01_2022-12-31.csv"), "old").unwrap();
        fs::write(target.join("y_2022-01-01_2022-12-31.csv"), "untouched").unwrap();

        let staging = StagingArea::create(&target).unwrap();
        let staged = staging.path().join("x_2023-01-01_2023-01-31.csv");
        fs::write(&staged, "new").unwrap();
        let staging_root = staging.path().to_path_buf();

        let published = staging
            .publish(&[("x".to_string(), staged)], &ConsolidatedWriter::default())
            .unwrap();

        assert_eq!(published[0].1, target.join("x_2023-01-01_2023-01-31.csv"));
        assert_eq!(fs::read_to_string(&published[0].1).unwrap(), "new");
        assert!(!target.join("x_2022-01-01_2022-12-31.csv").exists());
        assert!(target.join("y_2022-01-01_2022-12-31.csv").exists());
        assert!(!staging_root.exists());
    }

    #[test]
    fn test_create_clears_stale_staging() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");
        let stale = StagingArea::staging_dir_for(&target);
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.csv"), "").unwrap();

        let staging = StagingArea::create(&target).unwrap();
        assert!(!staging.path().join("leftover.csv").exists());

        staging.discard().unwrap();
        assert!(!stale.exists());
        assert!(!target.exists());
    }
}
