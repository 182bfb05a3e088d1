//! Display formatting for terminal output
//!
//! Provides the human-readable summaries printed at the end of the
//! `resolve` and `reconcile` commands.

pub mod coverage;
pub mod report;

pub use coverage::format_coverage_summary;
pub use report::format_run_report;
