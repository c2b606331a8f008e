//! Schema alignment module
//!
//! Coerces loaded record batches onto a catalog table's schema.
//!
//! # Overview
//!
//! The target schema is authoritative. Alignment:
//! - Adds every missing target column as all-null of the declared type
//! - Casts shared columns to the declared type (lossy or strict)
//! - Drops extra columns and orders the output like the target
//!
//! Column helpers (lower-casing, renames, literal and timestamp columns)
//! prepare raw batches before they are aligned.

mod align;
mod columns;
mod types;

pub use align::{align_batch, cast_column, concat_aligned};
pub use columns::{
    lowercase_columns, rename_columns, stringify_columns, with_array_column, with_literal_column,
    with_timestamp_column,
};
pub use types::{ColumnDef, TargetSchema};
