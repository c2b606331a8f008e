//! Crate-wide error type
//!
//! Every job returns [`Result`]. Variants raised while validating input are
//! reported by [`Error::is_config`] so callers can tell them apart from
//! failures that happened mid-transfer.

use thiserror::Error;

/// Errors raised by the download, ingest and silver jobs
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required setting: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid month '{value}': expected YYYY-MM (e.g. 2023-01)")]
    InvalidMonth { value: String },

    #[error("Invalid month range: start {start} is after end {end}")]
    InvalidMonthRange { start: String, end: String },

    #[error("Malformed YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Malformed JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Table '{table}': {message}")]
    Table { table: String, message: String },

    // ============================================================================
    // Partition / Data Errors
    // ============================================================================
    #[error("Could not extract partition '{key}' from path: {path}")]
    UnmatchedPartitionPath { key: String, path: String },

    #[error("No parquet files found for partition {partition}")]
    EmptyPartition { partition: String },

    #[error("Schema mismatch: {message}")]
    SchemaMismatch { message: String },

    // ============================================================================
    // Transfer Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("No response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField { field: field.into() }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        let (field, message) = (field.into(), message.into());
        Self::InvalidConfigValue { field, message }
    }

    /// Problem with one table definition
    pub fn table(table: impl Into<String>, message: impl Into<String>) -> Self {
        let (table, message) = (table.into(), message.into());
        Self::Table { table, message }
    }

    /// A source partition that holds no readable files
    pub fn empty_partition(partition: impl Into<String>) -> Self {
        Self::EmptyPartition {
            partition: partition.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether this error was raised before any I/O took place
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::InvalidMonth { .. }
                | Error::InvalidMonthRange { .. }
                | Error::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Prefix an error with what was being attempted
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], building the message only on failure
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.with_context(|| message.into())
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}
