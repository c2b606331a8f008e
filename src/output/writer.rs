//! Parquet encoding
//!
//! Table files are snappy-compressed by default; the row group size bounds
//! how many rows a reader has to decode at once.

use crate::error::{Error, Result};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;

/// Rows per row group unless overridden
const DEFAULT_ROW_GROUP_ROWS: usize = 1 << 20;

/// Settings handed to every Parquet file a sink produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParquetWriterConfig {
    codec: Compression,
    max_rows_per_group: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            codec: Compression::SNAPPY,
            max_rows_per_group: DEFAULT_ROW_GROUP_ROWS,
        }
    }
}

impl ParquetWriterConfig {
    /// Snappy compression, 1M rows per group
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap each row group at `rows`
    #[must_use]
    pub fn with_row_group_size(self, rows: usize) -> Self {
        Self {
            max_rows_per_group: rows.max(1),
            ..self
        }
    }

    /// Store pages without compression
    #[must_use]
    pub fn uncompressed(self) -> Self {
        Self {
            codec: Compression::UNCOMPRESSED,
            ..self
        }
    }

    pub fn compression(&self) -> Compression {
        self.codec
    }

    pub fn row_group_size(&self) -> usize {
        self.max_rows_per_group
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.codec)
            .set_max_row_group_size(self.max_rows_per_group)
            .build()
    }
}

/// Streams record batches into a Parquet file over any `Write` target
pub struct ParquetWriter<W: Write + Send> {
    inner: ArrowWriter<W>,
    rows: usize,
}

impl<W: Write + Send> ParquetWriter<W> {
    pub fn new(target: W, schema: &Schema, config: &ParquetWriterConfig) -> Result<Self> {
        let schema: SchemaRef = schema.clone().into();
        let inner = ArrowWriter::try_new(target, schema, Some(config.properties()))
            .map_err(|e| Error::output(format!("cannot open parquet writer: {e}")))?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one batch; its schema must match the writer's
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        match self.inner.write(batch) {
            Ok(()) => {
                self.rows += batch.num_rows();
                Ok(())
            }
            Err(e) => Err(Error::output(format!("cannot encode batch: {e}"))),
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Write the footer and return the target with the total row count
    pub fn finish(self) -> Result<(W, usize)> {
        let Self { inner, rows } = self;
        inner
            .into_inner()
            .map(|target| (target, rows))
            .map_err(|e| Error::output(format!("cannot finalize parquet file: {e}")))
    }
}

/// Encode batches sharing one schema into an in-memory Parquet file
pub fn encode_batches(batches: &[RecordBatch], config: &ParquetWriterConfig) -> Result<Bytes> {
    let Some(first) = batches.first() else {
        return Err(Error::output("No batches to write"));
    };

    let mut writer = ParquetWriter::new(Vec::new(), &first.schema(), config)?;
    batches.iter().try_for_each(|batch| writer.write(batch))?;
    let (buffer, _) = writer.finish()?;
    Ok(Bytes::from(buffer))
}
