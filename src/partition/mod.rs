//! Partition discovery module
//!
//! Finds Hive-style partition keys (`key=value`) in listed object paths.
//!
//! # Overview
//!
//! Source files are laid out as `<prefix>/<key>=<value>/<file>.parquet`.
//! This module:
//! - Extracts the partition value from a path with a configurable pattern
//! - Discovers the sorted, deduplicated set of partitions under a prefix
//! - Resolves the files belonging to a single partition

mod discovery;

pub use discovery::{
    discover_partitions, list_partitions, resolve_partition_files, PartitionSpec, SourceFile,
    DEFAULT_PARTITION_KEY, PARQUET_SUFFIX,
};

#[cfg(test)]
mod tests;
