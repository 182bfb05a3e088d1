//! Service layer for statement-ledger
//!
//! The service layer holds the pipeline logic on top of the parsers and the
//! storage layer: choosing one extract per bank and month, reconciling
//! monthly batches into ledgers, and driving whole reconcile runs.

pub mod consolidate;
pub mod coverage;
pub mod reconciliation;

pub use consolidate::{BankReport, BankStatus, ConsolidationService, RunReport};
pub use coverage::{select_candidates, CoverageResolver, Resolution, ResolvedMonth, SkippedFile};
pub use reconciliation::LedgerReconciler;
