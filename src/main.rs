use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use statement_ledger::cli::{
    handle_config_command, handle_init_command, handle_reconcile_command, handle_resolve_command,
    ReconcileArgs, ResolveArgs,
};
use statement_ledger::config::{
    paths::{LedgerPaths, DATA_DIR_ENV},
    settings::Settings,
};

#[derive(Parser)]
#[command(
    name = "statement-ledger",
    version,
    about = "Consolidate bank statement extracts into reconciled ledgers",
    long_about = "statement-ledger picks one raw extract per bank and month, then \
                  reconciles the categorized monthly batches of each bank against \
                  known month-end balances and writes one consolidated ledger per bank."
)]
struct Cli {
    /// Base data directory (overrides the platform default)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose one raw extract per bank and month and write the month slices
    Resolve(ResolveArgs),

    /// Reconcile monthly batches into one ledger per bank
    Reconcile(ReconcileArgs),

    /// Create the data directory layout and default files
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("statement_ledger=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LedgerPaths::new(cli.data_dir)?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    match cli.command {
        Some(Commands::Resolve(args)) => {
            handle_resolve_command(&paths, args)?;
        }
        Some(Commands::Reconcile(args)) => {
            let report = handle_reconcile_command(&paths, &settings, args)?;
            if report.has_failures() {
                std::process::exit(1);
            }
        }
        Some(Commands::Init) => handle_init_command(&paths)?,
        Some(Commands::Config) => handle_config_command(&paths, &settings),
        None => {
            println!("statement-ledger - bank statement consolidation");
            println!();
            println!("Run 'statement-ledger --help' for usage information.");
        }
    }

    Ok(())
}
