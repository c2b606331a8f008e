//! Partition key extraction and discovery

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::types::UnmatchedPathPolicy;
use object_store::path::Path as ObjectPath;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Partition column used by the landing zone and every bronze table
pub const DEFAULT_PARTITION_KEY: &str = "ano_mes_referencia";

/// Suffix of the files considered by discovery
pub const PARQUET_SUFFIX: &str = ".parquet";

const DEFAULT_VALUE_PATTERN: &str = "[^/]+";
const YEAR_MONTH_PATTERN: &str = r"\d{4}-\d{2}";

/// How a partition key is embedded in object paths
#[derive(Debug, Clone)]
pub struct PartitionSpec {
    key_name: String,
    value_pattern: String,
    regex: Regex,
}

impl PartitionSpec {
    /// Partition `key_name=<anything up to the next slash>`
    pub fn new(key_name: impl Into<String>) -> Result<Self> {
        Self::with_pattern(key_name, DEFAULT_VALUE_PATTERN)
    }

    /// Partition `key_name=YYYY-MM`
    pub fn year_month(key_name: impl Into<String>) -> Result<Self> {
        Self::with_pattern(key_name, YEAR_MONTH_PATTERN)
    }

    /// Partition whose value must match `value_pattern`
    pub fn with_pattern(key_name: impl Into<String>, value_pattern: &str) -> Result<Self> {
        let key_name = key_name.into();
        if key_name.is_empty() || key_name.contains(['/', '=']) {
            return Err(Error::invalid_value(
                "partition_key",
                format!("'{key_name}' is not a valid partition column name"),
            ));
        }

        let regex = Regex::new(&format!(
            "(?:^|/){}=({value_pattern})(?:/|$)",
            regex::escape(&key_name)
        ))
        .map_err(|e| Error::invalid_value("partition_pattern", e.to_string()))?;

        Ok(Self {
            key_name,
            value_pattern: value_pattern.to_string(),
            regex,
        })
    }

    /// Name of the partition column
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Pattern the partition value must match
    pub fn value_pattern(&self) -> &str {
        &self.value_pattern
    }

    /// Extract the partition value from a path, if present
    pub fn extract(&self, path: &str) -> Option<String> {
        self.regex
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Directory segment for a partition value, e.g. `ano_mes_referencia=2023-01`
    pub fn partition_dir(&self, value: &str) -> String {
        format!("{}={value}", self.key_name)
    }
}

/// A listed source object and the partition it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Object path within the store
    pub path: ObjectPath,
    /// Partition value extracted from the path
    pub partition: String,
}

/// Compute the sorted, deduplicated partition values of a listing
///
/// Paths without a partition key are skipped or rejected depending on
/// `policy`.
pub fn discover_partitions<I, S>(
    paths: I,
    spec: &PartitionSpec,
    policy: UnmatchedPathPolicy,
) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut partitions = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        match spec.extract(path) {
            Some(value) => {
                partitions.insert(value);
            }
            None => match policy {
                UnmatchedPathPolicy::Fail => {
                    return Err(Error::UnmatchedPartitionPath {
                        key: spec.key_name().to_string(),
                        path: path.to_string(),
                    });
                }
                UnmatchedPathPolicy::Skip => {
                    debug!("Skipping file without partition key: {path}");
                }
            },
        }
    }

    Ok(partitions.into_iter().collect())
}

/// List every parquet object under `storage` and discover its partitions
pub async fn list_partitions(
    storage: &Storage,
    spec: &PartitionSpec,
    policy: UnmatchedPathPolicy,
) -> Result<Vec<String>> {
    info!("Discovering partitions under {storage}");

    let files = storage.list("", PARQUET_SUFFIX).await?;
    info!("Found {} parquet files in total", files.len());

    let partitions = discover_partitions(files.iter().map(AsRef::<str>::as_ref), spec, policy)?;
    info!("Found {} partitions: {:?}", partitions.len(), partitions);

    Ok(partitions)
}

/// Re-list the files of one partition
///
/// Fails with [`Error::EmptyPartition`] when the partition holds no parquet
/// file.
pub async fn resolve_partition_files(
    storage: &Storage,
    spec: &PartitionSpec,
    value: &str,
) -> Result<Vec<SourceFile>> {
    let files = storage.list(&spec.partition_dir(value), PARQUET_SUFFIX).await?;

    if files.is_empty() {
        return Err(Error::empty_partition(value));
    }

    Ok(files
        .into_iter()
        .map(|path| SourceFile {
            path,
            partition: value.to_string(),
        })
        .collect())
}
