//! Ingestion configuration and report types

use crate::catalog::TableDefinition;
use crate::error::Result;
use crate::output::ParquetWriterConfig;
use crate::partition::{PartitionSpec, DEFAULT_PARTITION_KEY};
use crate::storage::Storage;
use crate::types::{CastMode, UnmatchedPathPolicy, WriteMode};

use super::reader::DEFAULT_BATCH_SIZE;

/// Configuration of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Landing location holding `<key>=<value>/` directories
    pub source: Storage,
    /// Table written to
    pub table: TableDefinition,
    /// Root location of the table
    pub target: Storage,
    /// How partition keys are found in source paths
    pub partition_spec: PartitionSpec,
    /// Overwrite or append
    pub write_mode: WriteMode,
    /// What to do with source files outside any partition
    pub on_unmatched: UnmatchedPathPolicy,
    /// Behavior of failed casts
    pub cast_mode: CastMode,
    /// Rows per read chunk
    pub batch_size: usize,
    /// Cast every source column to string before alignment
    pub stringify: bool,
    /// Parquet writer settings
    pub writer: ParquetWriterConfig,
}

impl IngestConfig {
    /// Create a config with the default options
    pub fn new(source: Storage, table: TableDefinition, target: Storage) -> Result<Self> {
        Ok(Self {
            source,
            table,
            target,
            partition_spec: PartitionSpec::new(DEFAULT_PARTITION_KEY)?,
            write_mode: WriteMode::default(),
            on_unmatched: UnmatchedPathPolicy::default(),
            cast_mode: CastMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            stringify: false,
            writer: ParquetWriterConfig::default(),
        })
    }

    /// Set the partition spec
    #[must_use]
    pub fn with_partition_spec(mut self, spec: PartitionSpec) -> Self {
        self.partition_spec = spec;
        self
    }

    /// Set the write mode
    #[must_use]
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Set the unmatched path policy
    #[must_use]
    pub fn with_on_unmatched(mut self, policy: UnmatchedPathPolicy) -> Self {
        self.on_unmatched = policy;
        self
    }

    /// Set the cast mode
    #[must_use]
    pub fn with_cast_mode(mut self, mode: CastMode) -> Self {
        self.cast_mode = mode;
        self
    }

    /// Set the read chunk size
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Land every column as string first
    #[must_use]
    pub fn with_stringify(mut self, stringify: bool) -> Self {
        self.stringify = stringify;
        self
    }

    /// Set parquet writer settings
    #[must_use]
    pub fn with_writer_config(mut self, writer: ParquetWriterConfig) -> Self {
        self.writer = writer;
        self
    }
}

/// Statistics of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Partitions found in the source, sorted
    pub partitions: Vec<String>,
    /// Source files read
    pub files_read: usize,
    /// Rows written to the table
    pub rows_written: usize,
    /// Files written to the table
    pub files_written: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl IngestReport {
    /// True when the source held no partition at all
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
