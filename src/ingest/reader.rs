//! Chunked parquet reads

use crate::error::Result;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

/// Default number of rows per chunk
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

/// Open an in-memory parquet file as an iterator of batches of at most
/// `batch_size` rows
pub fn read_parquet(data: Bytes, batch_size: usize) -> Result<ParquetRecordBatchReader> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?
        .with_batch_size(batch_size.max(1))
        .build()?;
    Ok(reader)
}

/// Read an in-memory parquet file completely
pub fn read_parquet_batches(data: Bytes, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let batches = read_parquet(data, batch_size)?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}
