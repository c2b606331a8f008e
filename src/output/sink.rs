//! Partition-scoped writes into a table location

use super::writer::{encode_batches, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::schema::TargetSchema;
use crate::storage::{join_key, Storage};
use crate::types::WriteMode;
use arrow::array::{Array, StringArray};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of one partition write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Partition value written
    pub partition: String,
    /// Rows written
    pub rows: usize,
    /// URLs of the files written
    pub files_written: Vec<String>,
    /// Number of pre-existing objects removed (overwrite mode)
    pub files_removed: usize,
}

/// Writes aligned batches into `<location>/<partition_column>=<value>/`
///
/// Files are named `part-<uuid>.snappy.parquet`. The partition column stays inside
/// the file as well.
#[derive(Debug, Clone)]
pub struct PartitionSink {
    storage: Storage,
    schema: SchemaRef,
    partition_column: String,
    write_mode: WriteMode,
    config: ParquetWriterConfig,
}

impl PartitionSink {
    /// Create a sink for a table rooted at `storage`
    pub fn new(
        storage: Storage,
        schema: &TargetSchema,
        partition_column: impl Into<String>,
        write_mode: WriteMode,
    ) -> Result<Self> {
        let partition_column = partition_column.into();
        if !schema.contains(&partition_column) {
            return Err(Error::schema(format!(
                "partition column '{partition_column}' is not part of the table schema"
            )));
        }

        Ok(Self {
            storage,
            schema: schema.arrow_schema(),
            partition_column,
            write_mode,
            config: ParquetWriterConfig::default(),
        })
    }

    /// Override the parquet writer settings
    #[must_use]
    pub fn with_writer_config(mut self, config: ParquetWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Write mode of this sink
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Key prefix of one partition, relative to the table root
    pub fn partition_prefix(&self, value: &str) -> String {
        format!("{}={value}", self.partition_column)
    }

    /// Write all batches of one partition
    ///
    /// Overwrite mode writes the new file first and then removes every
    /// object that was in the partition before. Append mode only adds.
    /// An empty input leaves the partition untouched.
    pub async fn write_partition(
        &self,
        value: &str,
        batches: &[RecordBatch],
    ) -> Result<WriteSummary> {
        for batch in batches {
            self.check_batch(value, batch)?;
        }

        let non_empty: Vec<RecordBatch> = batches
            .iter()
            .filter(|b| b.num_rows() > 0)
            .cloned()
            .collect();
        let rows: usize = non_empty.iter().map(RecordBatch::num_rows).sum();

        let mut summary = WriteSummary {
            partition: value.to_string(),
            rows,
            ..WriteSummary::default()
        };
        if non_empty.is_empty() {
            debug!("Nothing to write for partition {value}");
            return Ok(summary);
        }

        let prefix = self.partition_prefix(value);
        let previous = match self.write_mode {
            WriteMode::OverwritePartition => self.storage.list(&prefix, "").await?,
            WriteMode::Append => Vec::new(),
        };

        let data = encode_batches(&non_empty, &self.config)?;
        let key = join_key(&prefix, &format!("part-{}.snappy.parquet", Uuid::new_v4()));
        let url = self.storage.put(&key, data).await?;
        info!("Wrote {rows} rows to {url} ({})", self.write_mode);
        summary.files_written.push(url);

        for path in &previous {
            self.storage.delete(path).await?;
        }
        summary.files_removed = previous.len();
        if !previous.is_empty() {
            debug!(
                "Removed {} previous objects from partition {value}",
                previous.len()
            );
        }

        Ok(summary)
    }

    fn check_batch(&self, value: &str, batch: &RecordBatch) -> Result<()> {
        if batch.schema() != self.schema {
            return Err(Error::schema(format!(
                "batch for partition {value} does not match the table schema"
            )));
        }

        let column = batch
            .column_by_name(&self.partition_column)
            .ok_or_else(|| Error::schema("partition column missing from batch"))?;
        if column.data_type() != &DataType::Utf8 {
            return Ok(());
        }

        let keys = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::output("Failed to downcast partition column"))?;
        let consistent = keys.iter().all(|key| key == Some(value));
        if !consistent {
            return Err(Error::schema(format!(
                "partition column '{}' holds values other than {value}",
                self.partition_column
            )));
        }
        Ok(())
    }
}
