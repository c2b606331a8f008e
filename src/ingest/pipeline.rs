//! Partition-aligned ingestion

use super::reader::read_parquet;
use super::types::{IngestConfig, IngestReport};
use crate::error::{Result, ResultExt};
use crate::output::PartitionSink;
use crate::partition::{list_partitions, resolve_partition_files, SourceFile};
use crate::schema::{
    align_batch, concat_aligned, lowercase_columns, rename_columns, stringify_columns,
    with_literal_column, with_timestamp_column, TargetSchema,
};
use crate::types::WriteMode;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info};

/// Reads a landing location partition by partition and writes the rows,
/// aligned to the table schema, into the table
pub struct Ingestor {
    config: IngestConfig,
    schema: TargetSchema,
    sink: PartitionSink,
}

impl Ingestor {
    /// Validate the config and prepare the sink
    pub fn new(config: IngestConfig) -> Result<Self> {
        let schema = config.table.schema()?;
        let sink = PartitionSink::new(
            config.target.clone(),
            &schema,
            config.table.partition_column.clone(),
            config.write_mode,
        )?
        .with_writer_config(config.writer.clone());

        Ok(Self {
            config,
            schema,
            sink,
        })
    }

    /// Target schema of the run
    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// Run the ingestion
    ///
    /// Partitions are processed one at a time in sorted order. A failing
    /// partition stops the run; partitions written before it stay written.
    pub async fn run(&self) -> Result<IngestReport> {
        let start = Instant::now();
        let config = &self.config;
        info!(
            "Ingesting {} into {} ({})",
            config.source, config.table.name, config.write_mode
        );

        let partitions =
            list_partitions(&config.source, &config.partition_spec, config.on_unmatched).await?;
        let mut report = IngestReport {
            partitions: partitions.clone(),
            ..IngestReport::default()
        };

        if partitions.is_empty() {
            info!("No partitions found under {}; nothing to do", config.source);
            return Ok(report);
        }

        let total = partitions.len();
        for (idx, partition) in partitions.iter().enumerate() {
            info!("Processing partition {}/{total}: {partition}", idx + 1);
            self.ingest_partition(partition, &mut report).await?;
        }

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        report.duration_ms = duration_ms;
        info!(
            "Ingestion of {} complete: {} partitions, {} files read, {} rows written",
            config.table.name, total, report.files_read, report.rows_written
        );
        Ok(report)
    }

    async fn ingest_partition(&self, partition: &str, report: &mut IngestReport) -> Result<()> {
        let files =
            resolve_partition_files(&self.config.source, &self.config.partition_spec, partition)
                .await?;
        info!("Found {} files for partition {partition}", files.len());

        let ingested_at = Utc::now();
        let mut pending = Vec::new();

        for file in &files {
            let chunks = self.read_file(file, ingested_at).await?;
            report.files_read += 1;

            match self.config.write_mode {
                WriteMode::OverwritePartition => pending.extend(chunks),
                WriteMode::Append => {
                    for chunk in chunks {
                        let aligned = align_batch(&chunk, &self.schema, self.config.cast_mode)?;
                        let summary = self
                            .sink
                            .write_partition(partition, std::slice::from_ref(&aligned))
                            .await?;
                        report.rows_written += summary.rows;
                        report.files_written += summary.files_written.len();
                    }
                }
            }
        }

        if self.config.write_mode == WriteMode::OverwritePartition {
            let merged = concat_aligned(&pending, &self.schema, self.config.cast_mode)?;
            let summary = self
                .sink
                .write_partition(partition, std::slice::from_ref(&merged))
                .await?;
            report.rows_written += summary.rows;
            report.files_written += summary.files_written.len();
        }

        Ok(())
    }

    async fn read_file(
        &self,
        file: &SourceFile,
        ingested_at: DateTime<Utc>,
    ) -> Result<Vec<RecordBatch>> {
        let location = self.config.source.display_path(&file.path);
        debug!("Reading {location}");

        let data = self.config.source.get(&file.path).await?;
        let reader = read_parquet(data, self.config.batch_size)
            .with_context(|| format!("Failed to open {location}"))?;

        let mut chunks = Vec::new();
        for batch in reader {
            let batch = batch?;
            debug!("Read chunk of {} rows from {location}", batch.num_rows());
            chunks.push(self.prepare(&batch, &file.partition, ingested_at)?);
        }
        Ok(chunks)
    }

    /// Apply the landing conventions; alignment happens at write time
    fn prepare(
        &self,
        batch: &RecordBatch,
        partition: &str,
        ingested_at: DateTime<Utc>,
    ) -> Result<RecordBatch> {
        let table = &self.config.table;

        let mut batch = if self.config.stringify {
            stringify_columns(batch)?
        } else {
            batch.clone()
        };
        batch = lowercase_columns(&batch)?;
        batch = rename_columns(&batch, &table.column_renames)?;
        batch = with_literal_column(&batch, &table.partition_column, partition)?;
        if let Some(column) = &table.ingestion_column {
            batch = with_timestamp_column(&batch, column, ingested_at)?;
        }
        Ok(batch)
    }
}
