//! Storage layer for statement-ledger
//!
//! Provides CSV and JSON file storage with atomic writes: raw month slices,
//! normalized batches, consolidated ledgers, the balances lookup and staged
//! publication of a run's output.

pub mod balances;
pub mod batches;
pub mod file_io;
pub mod init;
pub mod ledger;
pub mod staging;

pub use balances::load_ground_truth;
pub use batches::{discover, read_batch, write_month_slice, BatchIndex};
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use ledger::ConsolidatedWriter;
pub use staging::StagingArea;
