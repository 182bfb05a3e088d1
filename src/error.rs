//! Custom error types for statement-ledger
//!
//! The variants follow the pipeline's failure classes: filename parse errors
//! are skipped by the resolver, reconciliation errors abort a single bank, and
//! infrastructure errors (I/O, storage, configuration) are fatal for the run.

use thiserror::Error;

/// The main error type for statement-ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Extract filename or date grammar mismatch
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// A bank's reconciliation could not be completed
    #[error("Reconciliation error for '{bank}': {message}")]
    Reconciliation { bank: String, message: String },

    /// The ground-truth balances mapping is unreadable or malformed
    #[error("Ground truth error: {0}")]
    GroundTruth(String),

    /// Storage errors (atomic writes, staging, publishing)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a reconciliation error scoped to a bank
    pub fn reconciliation(bank: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reconciliation {
            bank: bank.into(),
            message: message.into(),
        }
    }

    /// Infrastructure failures abort the whole run instead of a single bank
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage(_) | Self::Config(_))
    }

    /// Check if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for statement-ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
