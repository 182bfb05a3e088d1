//! User settings for statement-ledger
//!
//! Manages pipeline preferences: the batch/ledger file extension, the drift
//! tolerance used for reporting, when to reconcile banks in parallel, whether
//! runs are staged, and the default log filter.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::storage::file_io;

/// User settings for statement-ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Extension of batch and ledger files
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Adjustments at least this large are reported as drift
    #[serde(default = "default_tolerance")]
    pub tolerance: Money,

    /// Reconcile one bank per thread at or above this many banks
    #[serde(default = "default_parallel_min_banks")]
    pub parallel_min_banks: usize,

    /// Write ledgers to a staging directory and publish them at the end
    #[serde(default = "default_stage_runs")]
    pub stage_runs: bool,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_output_extension() -> String {
    "csv".to_string()
}

fn default_tolerance() -> Money {
    Money::from_cents(1)
}

fn default_parallel_min_banks() -> usize {
    4
}

fn default_stage_runs() -> bool {
    false
}

fn default_log_filter() -> String {
    "statement_ledger=info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            output_extension: default_output_extension(),
            tolerance: default_tolerance(),
            parallel_min_banks: default_parallel_min_banks(),
            stage_runs: default_stage_runs(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> LedgerResult<Self> {
        let settings: Settings = file_io::read_json(paths.settings_file()).map_err(|e| match e {
            LedgerError::Json(msg) => LedgerError::Config(format!("Failed to parse settings file: {}", msg)),
            other => other,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> LedgerResult<()> {
        file_io::write_json_atomic(paths.settings_file(), self)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> LedgerResult<()> {
        let ext = self.output_extension.as_str();
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(LedgerError::Config(format!(
                "output_extension must be a bare extension such as \"csv\", got {:?}",
                ext
            )));
        }
        if self.tolerance.is_negative() {
            return Err(LedgerError::Config(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }
        if self.parallel_min_banks == 0 {
            return Err(LedgerError::Config(
                "parallel_min_banks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
