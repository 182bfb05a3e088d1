//! Core data models for statement-ledger
//!
//! This module contains the data structures shared by the pipeline stages:
//! amounts, calendar months, raw extracts and their coverage claims,
//! standard-schema transactions and the confirmed balances used for
//! reconciliation.

pub mod extract;
pub mod ground_truth;
pub mod ledger;
pub mod money;
pub mod month;
pub mod transaction;

pub use extract::{CoverageCandidate, MonthRows, RawExtractFile, RawRow};
pub use ground_truth::{BankCheckpoints, GroundTruthBalances};
pub use ledger::{Ledger, MonthlyBatch, ReconciliationPoint};
pub use money::Money;
pub use month::MonthKey;
pub use transaction::{AdjustmentKind, Transaction};
