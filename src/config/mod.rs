//! Configuration module for statement-ledger
//!
//! This module provides configuration management including:
//! - Data directory resolution and the fixed pipeline layout
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
