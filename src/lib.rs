//! statement-ledger - consolidated, reconciled bank ledgers from raw extracts
//!
//! This library turns overlapping bank statement extracts into one ledger per
//! bank. Month coverage is resolved from the extract filenames, and each
//! bank's monthly batches are folded into a running balance that is anchored
//! to known month-end balances.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, months, transactions, ledgers)
//! - `parsers`: Bank-specific extract filename and row readers
//! - `storage`: CSV/JSON file storage, staging and publishing
//! - `services`: Coverage resolution and ledger reconciliation
//! - `display`: Terminal summaries
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use statement_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use statement_ledger::services::ConsolidationService;
//!
//! let paths = LedgerPaths::new(None)?;
//! let settings = Settings::load_or_create(&paths)?;
//! let service = ConsolidationService::from_balances_file(&settings, &paths.balances_file())?;
//! let report = service.run(&paths.categorized_dir(), &paths.reconciled_dir())?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod parsers;
pub mod services;
pub mod storage;

pub use error::LedgerError;
