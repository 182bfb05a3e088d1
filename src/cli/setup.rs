//! Init and config CLI commands

use crate::config::{paths::LedgerPaths, settings::Settings};
use crate::error::LedgerResult;
use crate::storage::initialize_storage;

/// Handle the init command
pub fn handle_init_command(paths: &LedgerPaths) -> LedgerResult<()> {
    println!("Initializing statement-ledger at: {}", paths.base_dir().display());
    let report = initialize_storage(paths)?;

    if report.created_settings {
        println!("  Created {}", paths.settings_file().display());
    }
    if report.created_balances {
        println!("  Created {}", paths.balances_file().display());
    }
    println!("Initialization complete!");
    println!();
    println!("Drop raw extracts into {}", paths.raw_dir().display());
    println!("and run 'statement-ledger resolve'.");

    Ok(())
}

/// Handle the config command
pub fn handle_config_command(paths: &LedgerPaths, settings: &Settings) {
    println!("statement-ledger Configuration");
    println!("==============================");
    println!("Base directory:       {}", paths.base_dir().display());
    println!("Settings file:        {}", paths.settings_file().display());
    println!("Balances file:        {}", paths.balances_file().display());
    println!("Raw extracts:         {}", paths.raw_dir().display());
    println!("Resolved slices:      {}", paths.resolved_dir().display());
    println!("Categorized batches:  {}", paths.categorized_dir().display());
    println!("Reconciled ledgers:   {}", paths.reconciled_dir().display());
    println!();
    println!("Settings:");
    println!("  Output extension:   {}", settings.output_extension);
    println!("  Drift tolerance:    {}", settings.tolerance);
    println!("  Parallel from:      {} banks", settings.parallel_min_banks);
    println!("  Staged runs:        {}", settings.stage_runs);
    println!("  Log filter:         {}", settings.log_filter);
}
