//! Bronze ingestion
//!
//! Discovers the partitions of a landing location, reads each partition's
//! parquet files in chunks, aligns them to a catalog table and writes them
//! with overwrite or append semantics.

mod pipeline;
mod reader;
mod types;

pub use pipeline::Ingestor;
pub use reader::{read_parquet, read_parquet_batches, DEFAULT_BATCH_SIZE};
pub use types::{IngestConfig, IngestReport};

#[cfg(test)]
mod tests;
