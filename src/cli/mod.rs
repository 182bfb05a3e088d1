//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod reconcile;
pub mod resolve;
pub mod setup;

pub use reconcile::{handle_reconcile_command, ReconcileArgs};
pub use resolve::{handle_resolve_command, ResolveArgs};
pub use setup::{handle_config_command, handle_init_command};
