//! CLI module
//!
//! Command-line interface for the batch jobs.
//!
//! # Commands
//!
//! - `download` - Fetch monthly trip files into the landing zone
//! - `ingest` - Load a landing location into a bronze table
//! - `silver` - Rebuild the unified silver trip table
//! - `tables` - List built-in table definitions

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
