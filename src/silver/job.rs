//! Silver unification job

use super::transform::{to_silver, ServiceType};
use crate::catalog::TableDefinition;
use crate::error::Result;
use crate::ingest::{read_parquet, DEFAULT_BATCH_SIZE};
use crate::output::{ParquetWriterConfig, PartitionSink};
use crate::partition::{list_partitions, PartitionSpec, PARQUET_SUFFIX};
use crate::schema::TargetSchema;
use crate::storage::Storage;
use crate::types::{CastMode, UnmatchedPathPolicy, WriteMode};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// A bronze input of the silver job
#[derive(Debug, Clone)]
pub struct SilverSource {
    /// Service the rows belong to
    pub service: ServiceType,
    /// Bronze table definition
    pub table: TableDefinition,
    /// Location of the bronze table
    pub storage: Storage,
}

impl SilverSource {
    /// Create a source
    pub fn new(service: ServiceType, table: TableDefinition, storage: Storage) -> Self {
        Self {
            service,
            table,
            storage,
        }
    }
}

/// Configuration of the silver job
#[derive(Debug, Clone)]
pub struct SilverConfig {
    /// Bronze inputs, in output order
    pub sources: Vec<SilverSource>,
    /// Silver table definition
    pub target: TableDefinition,
    /// Location of the silver table
    pub target_storage: Storage,
    /// Behavior of failed casts
    pub cast_mode: CastMode,
    /// Parquet writer settings
    pub writer: ParquetWriterConfig,
}

impl SilverConfig {
    /// Create a config for the yellow and green bronze tables
    pub fn new(
        yellow: SilverSource,
        green: SilverSource,
        target: TableDefinition,
        target_storage: Storage,
    ) -> Self {
        Self {
            sources: vec![yellow, green],
            target,
            target_storage,
            cast_mode: CastMode::default(),
            writer: ParquetWriterConfig::default(),
        }
    }

    /// Set the cast mode
    #[must_use]
    pub fn with_cast_mode(mut self, mode: CastMode) -> Self {
        self.cast_mode = mode;
        self
    }

    /// Set parquet writer settings
    #[must_use]
    pub fn with_writer_config(mut self, writer: ParquetWriterConfig) -> Self {
        self.writer = writer;
        self
    }
}

/// Statistics of one silver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilverReport {
    /// Partitions written, sorted
    pub partitions: Vec<String>,
    /// Rows written per service label
    pub rows_by_service: Vec<(String, usize)>,
    /// Rows written in total
    pub rows_written: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Rebuilds the silver trip table from the bronze tables, one partition at
/// a time
pub struct SilverJob {
    config: SilverConfig,
    schema: TargetSchema,
    sink: PartitionSink,
}

impl SilverJob {
    /// Validate the config and prepare the sink
    pub fn new(config: SilverConfig) -> Result<Self> {
        let schema = config.target.schema()?;
        let sink = PartitionSink::new(
            config.target_storage.clone(),
            &schema,
            config.target.partition_column.clone(),
            WriteMode::OverwritePartition,
        )?
        .with_writer_config(config.writer.clone());

        Ok(Self {
            config,
            schema,
            sink,
        })
    }

    /// Run the job
    pub async fn run(&self) -> Result<SilverReport> {
        let start = Instant::now();
        let created_at = Utc::now();
        info!("Building {}", self.config.target.name);

        let partitions = self.discover().await?;
        let mut report = SilverReport {
            partitions: partitions.clone(),
            rows_by_service: self
                .config
                .sources
                .iter()
                .map(|source| (source.service.label().to_string(), 0))
                .collect(),
            ..SilverReport::default()
        };

        if partitions.is_empty() {
            info!("No bronze partitions found; nothing to do");
            return Ok(report);
        }

        let total = partitions.len();
        for (idx, partition) in partitions.iter().enumerate() {
            info!("Processing partition {}/{total}: {partition}", idx + 1);

            let mut batches = Vec::new();
            for (source, counter) in self
                .config
                .sources
                .iter()
                .zip(report.rows_by_service.iter_mut())
            {
                let rows = self.read_source(source, partition, created_at).await?;
                counter.1 += rows.iter().map(RecordBatch::num_rows).sum::<usize>();
                batches.extend(rows);
            }

            let summary = self.sink.write_partition(partition, &batches).await?;
            report.rows_written += summary.rows;
        }

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        report.duration_ms = duration_ms;
        info!(
            "{} complete: {} partitions, {} rows",
            self.config.target.name, total, report.rows_written
        );
        Ok(report)
    }

    /// Union of the partitions of every bronze table
    async fn discover(&self) -> Result<Vec<String>> {
        let mut partitions = BTreeSet::new();
        for source in &self.config.sources {
            let spec = PartitionSpec::new(source.table.partition_column.clone())?;
            let found =
                list_partitions(&source.storage, &spec, UnmatchedPathPolicy::Skip).await?;
            partitions.extend(found);
        }
        Ok(partitions.into_iter().collect())
    }

    async fn read_source(
        &self,
        source: &SilverSource,
        partition: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Vec<RecordBatch>> {
        let dir = format!("{}={partition}", source.table.partition_column);
        let files = source.storage.list(&dir, PARQUET_SUFFIX).await?;
        debug!(
            "{} files for {} partition {partition}",
            files.len(),
            source.table.name
        );

        let mut batches = Vec::new();
        for path in &files {
            let data = source.storage.get(path).await?;
            for batch in read_parquet(data, DEFAULT_BATCH_SIZE)? {
                batches.push(to_silver(
                    &batch?,
                    source.service,
                    created_at,
                    &self.schema,
                    self.config.cast_mode,
                )?);
            }
        }
        Ok(batches)
    }
}
