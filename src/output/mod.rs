//! Output module
//!
//! Parquet encoding and partition-scoped writes into table locations.
//!
//! # Overview
//!
//! - [`ParquetWriter`] wraps the Arrow writer over any `Write` sink
//! - [`encode_batches`] produces an in-memory Parquet file
//! - [`PartitionSink`] places files under `<column>=<value>/` with
//!   overwrite or append semantics

mod sink;
mod writer;

pub use sink::{PartitionSink, WriteSummary};
pub use writer::{encode_batches, ParquetWriter, ParquetWriterConfig};
