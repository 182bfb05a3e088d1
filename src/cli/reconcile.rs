//! Reconcile CLI command
//!
//! Reconciles every bank's monthly batches against the ground-truth
//! balances and writes one consolidated ledger per bank.

use clap::Args;
use std::path::PathBuf;

use crate::config::{paths::LedgerPaths, settings::Settings};
use crate::display::format_run_report;
use crate::error::LedgerResult;
use crate::services::{ConsolidationService, RunReport};

/// Arguments for `reconcile`
#[derive(Args, Debug, Clone, Default)]
pub struct ReconcileArgs {
    /// Directory of categorized monthly batches (defaults to data/02--categorized)
    #[arg(long)]
    pub batches_dir: Option<PathBuf>,

    /// Ground-truth balances file (defaults to lookup/balances.json)
    #[arg(long)]
    pub balances: Option<PathBuf>,

    /// Where to write the ledgers (defaults to data/03--reconciled)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Handle the reconcile command
///
/// Bank failures are part of the returned report; only fatal errors are
/// returned as `Err`.
pub fn handle_reconcile_command(
    paths: &LedgerPaths,
    settings: &Settings,
    args: ReconcileArgs,
) -> LedgerResult<RunReport> {
    let batches_dir = args.batches_dir.unwrap_or_else(|| paths.categorized_dir());
    let balances = args.balances.unwrap_or_else(|| paths.balances_file());
    let out_dir = args.out_dir.unwrap_or_else(|| paths.reconciled_dir());

    let service = ConsolidationService::from_balances_file(settings, &balances)?;
    let report = service.run(&batches_dir, &out_dir)?;

    print!("{}", format_run_report(&report));

    Ok(report)
}
