//! Tests for partition module

use super::*;
use crate::error::Error;
use crate::storage::Storage;
use crate::types::UnmatchedPathPolicy;
use bytes::Bytes;
use pretty_assertions::assert_eq;

fn spec(key: &str) -> PartitionSpec {
    PartitionSpec::new(key).unwrap()
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_extract_simple() {
    let spec = spec("ano_mes_referencia");
    assert_eq!(
        spec.extract("s3://bucket/nyc/ano_mes_referencia=2023-01/yellow.parquet"),
        Some("2023-01".to_string())
    );
}

#[test]
fn test_extract_relative_path() {
    let spec = spec("k");
    assert_eq!(spec.extract("k=2023-01/f1.parquet"), Some("2023-01".to_string()));
}

#[test]
fn test_extract_missing_key() {
    let spec = spec("ano_mes_referencia");
    assert_eq!(spec.extract("nyc/2023-01/yellow.parquet"), None);
}

#[test]
fn test_extract_requires_segment_start() {
    let spec = spec("k");
    assert_eq!(spec.extract("a/bk=1/f.parquet"), None);
}

#[test]
fn test_extract_year_month_pattern() {
    let spec = PartitionSpec::year_month("ano_mes_referencia").unwrap();
    assert_eq!(
        spec.extract("p/ano_mes_referencia=2024-11/f.parquet"),
        Some("2024-11".to_string())
    );
    assert_eq!(spec.extract("p/ano_mes_referencia=latest/f.parquet"), None);
    assert_eq!(spec.extract("p/ano_mes_referencia=2024-111/f.parquet"), None);
}

#[test]
fn test_invalid_key_name() {
    assert!(PartitionSpec::new("").is_err());
    assert!(PartitionSpec::new("a/b").is_err());
    assert!(PartitionSpec::new("a=b").is_err());
}

#[test]
fn test_invalid_pattern() {
    let err = PartitionSpec::with_pattern("k", "(unclosed").unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_partition_dir() {
    assert_eq!(spec("k").partition_dir("2023-01"), "k=2023-01");
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[test]
fn test_discover_dedup_and_sort() {
    let paths = [
        "a/k=2023-01/f1.parquet",
        "a/k=2023-01/f2.parquet",
        "a/k=2023-02/f1.parquet",
    ];
    let partitions = discover_partitions(paths, &spec("k"), UnmatchedPathPolicy::Skip).unwrap();
    assert_eq!(partitions, vec!["2023-01", "2023-02"]);
}

#[test]
fn test_discover_independent_of_order() {
    let paths = [
        "a/k=2023-03/f.parquet",
        "a/k=2022-12/f.parquet",
        "a/k=2023-01/f.parquet",
        "a/k=2022-12/g.parquet",
    ];
    let mut reversed = paths;
    reversed.reverse();

    let forward = discover_partitions(paths, &spec("k"), UnmatchedPathPolicy::Skip).unwrap();
    let backward = discover_partitions(reversed, &spec("k"), UnmatchedPathPolicy::Skip).unwrap();

    assert_eq!(forward, vec!["2022-12", "2023-01", "2023-03"]);
    assert_eq!(forward, backward);
}

#[test]
fn test_discover_skip_unmatched() {
    let paths = ["a/k=2023-01/f.parquet", "a/loose.parquet"];
    let partitions = discover_partitions(paths, &spec("k"), UnmatchedPathPolicy::Skip).unwrap();
    assert_eq!(partitions, vec!["2023-01"]);
}

#[test]
fn test_discover_fail_unmatched() {
    let paths = ["a/k=2023-01/f.parquet", "a/loose.parquet"];
    let err = discover_partitions(paths, &spec("k"), UnmatchedPathPolicy::Fail).unwrap_err();
    match err {
        Error::UnmatchedPartitionPath { key, path } => {
            assert_eq!(key, "k");
            assert_eq!(path, "a/loose.parquet");
        }
        other => panic!("Expected UnmatchedPartitionPath, got {other:?}"),
    }
}

#[test]
fn test_discover_empty() {
    let paths: [&str; 0] = [];
    let partitions = discover_partitions(paths, &spec("k"), UnmatchedPathPolicy::Fail).unwrap();
    assert!(partitions.is_empty());
}

// ============================================================================
// Storage-backed Tests
// ============================================================================

async fn landing() -> Storage {
    let storage = Storage::in_memory().child("landing");
    for key in [
        "ano_mes_referencia=2023-02/yellow_tripdata_2023-02.parquet",
        "ano_mes_referencia=2023-01/yellow_tripdata_2023-01.parquet",
        "ano_mes_referencia=2023-01/extra.parquet",
        "ano_mes_referencia=2023-01/_SUCCESS",
        "README.md",
    ] {
        storage.put(key, Bytes::from_static(b"x")).await.unwrap();
    }
    storage
}

#[tokio::test]
async fn test_list_partitions() {
    let storage = landing().await;
    let partitions = list_partitions(
        &storage,
        &spec(DEFAULT_PARTITION_KEY),
        UnmatchedPathPolicy::Fail,
    )
    .await
    .unwrap();
    assert_eq!(partitions, vec!["2023-01", "2023-02"]);
}

#[tokio::test]
async fn test_resolve_partition_files() {
    let storage = landing().await;
    let files = resolve_partition_files(&storage, &spec(DEFAULT_PARTITION_KEY), "2023-01")
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.partition == "2023-01"));
    assert_eq!(
        files[0].path.as_ref(),
        "landing/ano_mes_referencia=2023-01/extra.parquet"
    );
}

#[tokio::test]
async fn test_resolve_empty_partition() {
    let storage = landing().await;
    let err = resolve_partition_files(&storage, &spec(DEFAULT_PARTITION_KEY), "2030-01")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyPartition { partition } if partition == "2030-01"));
}
