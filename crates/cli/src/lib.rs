//! Command-line front end for the hedging engine.
//!
//! The binary is a thin shell: [`loader`] turns JSON files into validated
//! event records, [`commands`] maps flags onto engine calls and prints the
//! results.

pub mod commands;
pub mod loader;
pub mod logging;

pub use loader::{load_records, LoadedRecords};
pub use logging::init_tracing;
