//! Tests for ingest module

use super::*;
use crate::catalog::{load_table_from_str, TableDefinition};
use crate::output::{encode_batches, ParquetWriterConfig};
use crate::partition::PartitionSpec;
use crate::storage::Storage;
use crate::types::{CastMode, UnmatchedPathPolicy, WriteMode};
use arrow::array::{Array, ArrayRef, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const TRIPS_TABLE: &str = r"
name: bronze_db.trips
partition_column: ano_mes_referencia
ingestion_column: data_hora_ingestao
column_renames:
  airport_fee: taxa_aeroporto
columns:
  - { name: vendorid, type: bigint }
  - { name: total_amount, type: double }
  - { name: taxa_aeroporto, type: double }
  - { name: data_hora_ingestao, type: timestamp }
  - { name: ano_mes_referencia, type: string }
";

fn trips_table() -> TableDefinition {
    load_table_from_str(TRIPS_TABLE).unwrap()
}

fn raw_batch(vendors: &[i64], amounts: &[&str]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("VendorID", DataType::Int64, true),
        Field::new("Total_Amount", DataType::Utf8, true),
        Field::new("store_and_fwd_flag", DataType::Utf8, true),
    ]);
    let vendors: ArrayRef = Arc::new(Int64Array::from(vendors.to_vec()));
    let amounts: ArrayRef = Arc::new(StringArray::from(amounts.to_vec()));
    let flags: ArrayRef = Arc::new(StringArray::from(vec!["N"; vendors.len()]));
    RecordBatch::try_new(Arc::new(schema), vec![vendors, amounts, flags]).unwrap()
}

async fn land(storage: &Storage, key: &str, batch: &RecordBatch) {
    let data = encode_batches(std::slice::from_ref(batch), &ParquetWriterConfig::default()).unwrap();
    storage.put(key, data).await.unwrap();
}

async fn landing_zone() -> Storage {
    let source = Storage::in_memory();
    land(
        &source,
        "ano_mes_referencia=2023-01/yellow_tripdata_2023-01.parquet",
        &raw_batch(&[1, 2, 2], &["10.5", "3", "7.25"]),
    )
    .await;
    land(
        &source,
        "ano_mes_referencia=2023-02/yellow_tripdata_2023-02.parquet",
        &raw_batch(&[6, 7], &["1", "2"]),
    )
    .await;
    source
}

async fn read_table(target: &Storage, partition: &str) -> Vec<RecordBatch> {
    let mut batches = Vec::new();
    let prefix = format!("ano_mes_referencia={partition}");
    for path in target.list(&prefix, ".parquet").await.unwrap() {
        let data = target.get(&path).await.unwrap();
        batches.extend(read_parquet_batches(data, DEFAULT_BATCH_SIZE).unwrap());
    }
    batches
}

fn total_rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(RecordBatch::num_rows).sum()
}

fn ingestor(source: &Storage, target: &Storage, mode: WriteMode) -> Ingestor {
    let config = IngestConfig::new(source.clone(), trips_table(), target.clone())
        .unwrap()
        .with_write_mode(mode);
    Ingestor::new(config).unwrap()
}

#[tokio::test]
async fn test_empty_source_is_noop() {
    let target = Storage::in_memory();
    let report = ingestor(&Storage::in_memory(), &target, WriteMode::OverwritePartition)
        .run()
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.rows_written, 0);
    assert!(target.list("", "").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ingest_aligns_to_table_schema() {
    let source = landing_zone().await;
    let target = Storage::in_memory();
    let ingestor = ingestor(&source, &target, WriteMode::OverwritePartition);

    let report = ingestor.run().await.unwrap();
    assert_eq!(report.partitions, vec!["2023-01", "2023-02"]);
    assert_eq!(report.files_read, 2);
    assert_eq!(report.rows_written, 5);
    assert_eq!(report.files_written, 2);

    let batches = read_table(&target, "2023-01").await;
    assert_eq!(total_rows(&batches), 3);
    let batch = &batches[0];
    assert_eq!(batch.schema().as_ref(), ingestor.schema().arrow_schema().as_ref());

    let amounts = batch
        .column_by_name("total_amount")
        .unwrap()
        .as_any()
        .downcast_ref::<arrow::array::Float64Array>()
        .unwrap();
    assert_eq!(amounts.value(0), 10.5);

    let missing = batch.column_by_name("taxa_aeroporto").unwrap();
    assert_eq!(missing.null_count(), 3);

    let keys = batch
        .column_by_name("ano_mes_referencia")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(keys.iter().all(|k| k == Some("2023-01")));

    let stamped = batch
        .column_by_name("data_hora_ingestao")
        .unwrap()
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .unwrap();
    assert_eq!(stamped.null_count(), 0);
}

#[tokio::test]
async fn test_overwrite_twice_equals_once() {
    let source = landing_zone().await;
    let target = Storage::in_memory();
    let ingestor = ingestor(&source, &target, WriteMode::OverwritePartition);

    ingestor.run().await.unwrap();
    let first = read_table(&target, "2023-01").await;
    ingestor.run().await.unwrap();
    let second = read_table(&target, "2023-01").await;

    assert_eq!(total_rows(&first), total_rows(&second));
    assert_eq!(
        target.list("ano_mes_referencia=2023-01", "").await.unwrap().len(),
        1
    );
    assert_eq!(
        first[0].column_by_name("vendorid"),
        second[0].column_by_name("vendorid")
    );
}

#[tokio::test]
async fn test_append_twice_doubles_rows() {
    let source = landing_zone().await;
    let target = Storage::in_memory();
    let ingestor = ingestor(&source, &target, WriteMode::Append);

    ingestor.run().await.unwrap();
    ingestor.run().await.unwrap();

    assert_eq!(total_rows(&read_table(&target, "2023-01").await), 6);
    assert_eq!(total_rows(&read_table(&target, "2023-02").await), 4);
}

#[tokio::test]
async fn test_append_writes_one_file_per_chunk() {
    let source = landing_zone().await;
    let target = Storage::in_memory();
    let config = IngestConfig::new(source, trips_table(), target.clone())
        .unwrap()
        .with_write_mode(WriteMode::Append)
        .with_batch_size(2);

    let report = Ingestor::new(config).unwrap().run().await.unwrap();
    // 3 rows in chunks of 2 plus 2 rows in one chunk
    assert_eq!(report.files_written, 3);
    assert_eq!(report.rows_written, 5);
}

#[tokio::test]
async fn test_unmatched_policy() {
    let source = landing_zone().await;
    land(&source, "stray/file.parquet", &raw_batch(&[1], &["1"])).await;
    let target = Storage::in_memory();

    let skip = IngestConfig::new(source.clone(), trips_table(), target.clone()).unwrap();
    let report = Ingestor::new(skip).unwrap().run().await.unwrap();
    assert_eq!(report.partitions.len(), 2);

    let fail = IngestConfig::new(source, trips_table(), target)
        .unwrap()
        .with_on_unmatched(UnmatchedPathPolicy::Fail);
    let err = Ingestor::new(fail).unwrap().run().await.unwrap_err();
    assert!(err.to_string().contains("stray/file.parquet"));
}

#[tokio::test]
async fn test_strict_cast_fails_partition() {
    let source = Storage::in_memory();
    land(
        &source,
        "ano_mes_referencia=2023-01/a.parquet",
        &raw_batch(&[1, 2], &["1.5", "not a number"]),
    )
    .await;

    let lossy_target = Storage::in_memory();
    let lossy = IngestConfig::new(source.clone(), trips_table(), lossy_target.clone()).unwrap();
    Ingestor::new(lossy).unwrap().run().await.unwrap();
    let batches = read_table(&lossy_target, "2023-01").await;
    assert_eq!(batches[0].column_by_name("total_amount").unwrap().null_count(), 1);

    let strict = IngestConfig::new(source, trips_table(), Storage::in_memory())
        .unwrap()
        .with_cast_mode(CastMode::Strict);
    let err = Ingestor::new(strict).unwrap().run().await.unwrap_err();
    assert!(err.to_string().contains("total_amount"));
}

#[tokio::test]
async fn test_failed_partition_keeps_earlier_partitions() {
    let source = Storage::in_memory();
    land(
        &source,
        "ano_mes_referencia=2023-01/a.parquet",
        &raw_batch(&[1, 2], &["1.5", "2"]),
    )
    .await;
    land(
        &source,
        "ano_mes_referencia=2023-02/b.parquet",
        &raw_batch(&[3], &["not a number"]),
    )
    .await;

    let target = Storage::in_memory();
    let strict = IngestConfig::new(source, trips_table(), target.clone())
        .unwrap()
        .with_cast_mode(CastMode::Strict);
    let err = Ingestor::new(strict).unwrap().run().await.unwrap_err();
    assert!(err.to_string().contains("total_amount"));

    assert_eq!(total_rows(&read_table(&target, "2023-01").await), 2);
    assert!(read_table(&target, "2023-02").await.is_empty());
}

#[tokio::test]
async fn test_overwrite_merges_files_by_column_name() {
    let source = landing_zone().await;
    let narrow = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("vendorid", DataType::Int64, true)])),
        vec![Arc::new(Int64Array::from(vec![9, 9])) as ArrayRef],
    )
    .unwrap();
    land(&source, "ano_mes_referencia=2023-01/narrow.parquet", &narrow).await;

    let target = Storage::in_memory();
    let report = ingestor(&source, &target, WriteMode::OverwritePartition)
        .run()
        .await
        .unwrap();
    assert_eq!(report.files_read, 3);
    assert_eq!(report.files_written, 2);

    let batches = read_table(&target, "2023-01").await;
    assert_eq!(total_rows(&batches), 5);
    let amounts_null: usize = batches
        .iter()
        .map(|b| b.column_by_name("total_amount").unwrap().null_count())
        .sum();
    assert_eq!(amounts_null, 2);
}

#[tokio::test]
async fn test_renames_and_stringify() {
    let source = Storage::in_memory();
    let schema = Schema::new(vec![
        Field::new("VendorID", DataType::Int32, true),
        Field::new("Airport_fee", DataType::Float32, true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(arrow::array::Int32Array::from(vec![1])) as ArrayRef,
            Arc::new(arrow::array::Float32Array::from(vec![1.25])) as ArrayRef,
        ],
    )
    .unwrap();
    land(&source, "ano_mes_referencia=2024-03/a.parquet", &batch).await;

    let target = Storage::in_memory();
    let config = IngestConfig::new(source, trips_table(), target.clone())
        .unwrap()
        .with_stringify(true)
        .with_partition_spec(PartitionSpec::year_month("ano_mes_referencia").unwrap());
    Ingestor::new(config).unwrap().run().await.unwrap();

    let batches = read_table(&target, "2024-03").await;
    let fee = batches[0]
        .column_by_name("taxa_aeroporto")
        .unwrap()
        .as_any()
        .downcast_ref::<arrow::array::Float64Array>()
        .unwrap();
    assert_eq!(fee.value(0), 1.25);
}
