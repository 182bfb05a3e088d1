//! Resolve CLI command
//!
//! Picks one raw extract per bank and month and writes the chosen month
//! slices for the downstream normalization step.

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::paths::LedgerPaths;
use crate::display::format_coverage_summary;
use crate::error::{LedgerError, LedgerResult};
use crate::parsers::ParserRegistry;
use crate::services::{CoverageResolver, Resolution};
use crate::storage::write_month_slice;

/// Arguments for `resolve`
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Directory of raw bank extracts (defaults to data/00--raw)
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Where to write the month slices (defaults to data/01--resolved)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Handle the resolve command
pub fn handle_resolve_command(paths: &LedgerPaths, args: ResolveArgs) -> LedgerResult<Resolution> {
    let raw_dir = args.raw_dir.unwrap_or_else(|| paths.raw_dir());
    let out_dir = args.out_dir.unwrap_or_else(|| paths.resolved_dir());

    let registry = ParserRegistry::default();
    let resolution = CoverageResolver::new(&registry).resolve(&raw_dir)?;

    std::fs::create_dir_all(&out_dir).map_err(|e| {
        LedgerError::Io(format!("Failed to create {}: {}", out_dir.display(), e))
    })?;

    for (bank, months) in &resolution.months {
        for (month, resolved) in months {
            let path = write_month_slice(&out_dir, bank, *month, &resolved.rows)?;
            info!(
                bank = bank.as_str(),
                month = %month,
                source = %resolved.source.display(),
                "Wrote {}",
                path.display()
            );
        }
    }

    print!("{}", format_coverage_summary(&resolution));
    println!();
    println!(
        "{} month slice(s) written to {}",
        resolution.month_count(),
        out_dir.display()
    );

    Ok(resolution)
}
