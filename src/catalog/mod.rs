//! Catalog module
//!
//! Table definitions (name, location, partition column, typed columns)
//! loaded from YAML.
//!
//! # Overview
//!
//! The catalog module provides:
//! - `TableDefinition` - Declarative table specification
//! - Lookup by `<db>.<table>` in a catalog directory or by file path
//! - Built-in definitions for the bronze and silver tables

mod builtin;
mod loader;
mod types;

pub use builtin::{get_builtin, list_builtin};
pub use loader::{load_table, load_table_from_str};
pub use types::TableDefinition;
