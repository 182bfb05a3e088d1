//! Path management for statement-ledger
//!
//! Provides the fixed pipeline layout under one base directory.
//!
//! ## Path Resolution Order
//!
//! 1. An explicit base directory (the `--data-dir` flag)
//! 2. `STATEMENT_LEDGER_DATA_DIR` environment variable (if set)
//! 3. The platform data directory, e.g. `~/.local/share/statement-ledger`
//!
//! ## Layout
//!
//! ```text
//! <base>/config.json
//! <base>/lookup/balances.json
//! <base>/data/00--raw
//! <base>/data/01--resolved
//! <base>/data/02--categorized
//! <base>/data/03--reconciled
//! ```

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "STATEMENT_LEDGER_DATA_DIR";

/// Manages all paths used by statement-ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    /// Base directory for all pipeline data
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a new LedgerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the platform data
    /// directory cannot be determined.
    pub fn new(base_override: Option<PathBuf>) -> LedgerResult<Self> {
        let base_dir = match base_override {
            Some(dir) => dir,
            None => match std::env::var_os(DATA_DIR_ENV) {
                Some(custom) if !custom.is_empty() => PathBuf::from(custom),
                _ => resolve_default_path()?,
            },
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn lookup_dir(&self) -> PathBuf {
        self.base_dir.join("lookup")
    }

    /// Get the path to the ground-truth balances mapping
    pub fn balances_file(&self) -> PathBuf {
        self.lookup_dir().join("balances.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Raw extracts as downloaded from the banks
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir().join("00--raw")
    }

    /// One raw slice per resolved (bank, month)
    pub fn resolved_dir(&self) -> PathBuf {
        self.data_dir().join("01--resolved")
    }

    /// Normalized and categorized monthly batches
    pub fn categorized_dir(&self) -> PathBuf {
        self.data_dir().join("02--categorized")
    }

    /// Consolidated, reconciled ledgers
    pub fn reconciled_dir(&self) -> PathBuf {
        self.data_dir().join("03--reconciled")
    }

    /// Ensure all pipeline directories exist
    pub fn ensure_directories(&self) -> LedgerResult<()> {
        for dir in [
            self.base_dir.clone(),
            self.lookup_dir(),
            self.raw_dir(),
            self.resolved_dir(),
            self.categorized_dir(),
            self.reconciled_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                LedgerError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        Ok(())
    }

    /// Check if the data directory has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the platform data directory
fn resolve_default_path() -> LedgerResult<PathBuf> {
    ProjectDirs::from("", "", "statement-ledger")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            LedgerError::Config(format!(
                "Could not determine a data directory; set {} or pass --data-dir",
                DATA_DIR_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.reconciled_dir(),
            temp_dir.path().join("data").join("03--reconciled")
        );
    }

    #[test]
    fn test_explicit_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::new(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.lookup_dir().exists());
        assert!(paths.raw_dir().exists());
        assert!(paths.resolved_dir().exists());
        assert!(paths.categorized_dir().exists());
        assert!(paths.reconciled_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.balances_file(),
            temp_dir.path().join("lookup").join("balances.json")
        );
    }
}
