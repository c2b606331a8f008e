//! Common types used throughout taxi-lake
//!
//! This module contains the small enums that configure how the jobs
//! behave: write modes, cast policy, partition-path policy, catalog
//! column types and the dataset categories of the download job.

use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Write Mode
// ============================================================================

/// How aligned batches are written into a partition of the target table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace every object of the partition; re-runs are idempotent
    #[default]
    OverwritePartition,
    /// Add new objects next to existing ones; re-runs duplicate rows
    Append,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::OverwritePartition => write!(f, "overwrite_partition"),
            WriteMode::Append => write!(f, "append"),
        }
    }
}

// ============================================================================
// Unmatched Path Policy
// ============================================================================

/// What discovery does with a listed file whose path carries no partition key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPathPolicy {
    /// Ignore the file
    #[default]
    Skip,
    /// Abort the run
    Fail,
}

// ============================================================================
// Cast Mode
// ============================================================================

/// Cast policy used during schema alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CastMode {
    /// Values that cannot be converted become null ("lossy cast")
    #[default]
    Lossy,
    /// Any unconvertible value fails the batch
    Strict,
}

impl CastMode {
    /// Whether invalid values are replaced by null
    pub fn is_lossy(self) -> bool {
        matches!(self, CastMode::Lossy)
    }
}

// ============================================================================
// Column Type
// ============================================================================

/// Column type as declared in a catalog table definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "varchar")]
    String,
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "long")]
    Bigint,
    Double,
    Float,
    #[serde(alias = "bool")]
    Boolean,
    Timestamp,
    Date,
}

impl ColumnType {
    /// Arrow type used for this column in memory and in parquet
    pub fn to_arrow(self) -> DataType {
        match self {
            ColumnType::String => DataType::Utf8,
            ColumnType::Int => DataType::Int32,
            ColumnType::Bigint => DataType::Int64,
            ColumnType::Double => DataType::Float64,
            ColumnType::Float => DataType::Float32,
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            ColumnType::Date => DataType::Date32,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Bigint => "bigint",
            ColumnType::Double => "double",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Dataset Kind
// ============================================================================

/// Trip record categories published by the TLC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Yellow taxi
    Yellow,
    /// Green taxi
    Green,
    /// For-hire vehicle (FHV)
    #[value(alias = "fhv")]
    #[serde(alias = "fhv")]
    Forhire,
    /// High volume for-hire vehicle (FHVHV)
    #[value(alias = "fhvhv")]
    #[serde(alias = "fhvhv")]
    Highvolumeforhire,
}

impl DatasetKind {
    /// File name prefix used by the publisher, e.g. `yellow_tripdata`
    pub fn file_prefix(self) -> &'static str {
        match self {
            DatasetKind::Yellow => "yellow_tripdata",
            DatasetKind::Green => "green_tripdata",
            DatasetKind::Forhire => "fhv_tripdata",
            DatasetKind::Highvolumeforhire => "fhvhv_tripdata",
        }
    }

    /// Published file name for a month, e.g. `yellow_tripdata_2023-01.parquet`
    pub fn file_name(self, month: &str) -> String {
        format!("{}_{month}.parquet", self.file_prefix())
    }

    /// Built-in bronze table fed by this dataset
    pub fn bronze_table(self) -> &'static str {
        match self {
            DatasetKind::Yellow => "bronze_db.nyc_taxi_data_yellow",
            DatasetKind::Green => "bronze_db.nyc_taxi_data_green",
            DatasetKind::Forhire => "bronze_db.nyc_taxi_data_forhire",
            DatasetKind::Highvolumeforhire => "bronze_db.nyc_taxi_data_highvolumeforhire",
        }
    }

    /// Default write mode when ingesting this dataset
    ///
    /// The high-volume files are appended chunk by chunk.
    pub fn default_write_mode(self) -> WriteMode {
        match self {
            DatasetKind::Highvolumeforhire => WriteMode::Append,
            _ => WriteMode::OverwritePartition,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::Yellow => "yellow",
            DatasetKind::Green => "green",
            DatasetKind::Forhire => "forhire",
            DatasetKind::Highvolumeforhire => "highvolumeforhire",
        };
        f.write_str(name)
    }
}
