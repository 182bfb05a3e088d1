//! Storage initialization
//!
//! Handles first-run setup of a data directory

use crate::config::{paths::LedgerPaths, settings::Settings};
use crate::error::LedgerResult;

use super::file_io::write_json_atomic;

/// What `initialize_storage` created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub created_settings: bool,
    pub created_balances: bool,
}

/// Initialize a data directory
///
/// Creates the directory layout, default settings and an empty balances
/// mapping. Existing files are never overwritten.
pub fn initialize_storage(paths: &LedgerPaths) -> LedgerResult<InitReport> {
    paths.ensure_directories()?;

    let mut report = InitReport::default();

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
        report.created_settings = true;
    }

    if !paths.balances_file().exists() {
        write_json_atomic(paths.balances_file(), &serde_json::Map::new())?;
        report.created_balances = true;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let report = initialize_storage(&paths).unwrap();
        assert!(report.created_settings && report.created_balances);
        assert!(paths.is_initialized());
        assert!(paths.raw_dir().exists());
        assert_eq!(fs::read_to_string(paths.balances_file()).unwrap(), "{}");
    }

    #[test]
    fn test_initialize_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        fs::write(paths.balances_file(), r#"{"x": {"initial": 1}}"#).unwrap();

        let report = initialize_storage(&paths).unwrap();
        assert!(report.created_settings);
        assert!(!report.created_balances);
        assert_eq!(
            fs::read_to_string(paths.balances_file()).unwrap(),
            r#"{"x": {"initial": 1}}"#
        );

        let again = initialize_storage(&paths).unwrap();
        assert_eq!(again, InitReport::default());
    }
}
