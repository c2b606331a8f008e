//! CLI runner - maps commands onto job configs and executes them

use crate::catalog::{list_builtin, load_table, TableDefinition};
use crate::cli::commands::{Cli, Commands};
use crate::download::{DownloadConfig, Downloader};
use crate::error::Result;
use crate::ingest::{IngestConfig, Ingestor};
use crate::partition::PartitionSpec;
use crate::silver::{ServiceType, SilverConfig, SilverJob, SilverSource};
use crate::storage::{Storage, StorageCredentials};
use crate::types::{DatasetKind, WriteMode};
use clap::ValueEnum;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let summary = self.execute().await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    /// Run the command and return its JSON summary
    pub async fn execute(&self) -> Result<Value> {
        match &self.cli.command {
            Commands::Download {
                dataset,
                start_month,
                end_month,
                bucket,
                prefix,
                base_url,
                timeout_secs,
                pause_ms,
            } => {
                let config = DownloadConfig::new(*dataset)
                    .with_months(start_month.clone(), end_month.clone())
                    .with_base_url(base_url.as_str())
                    .with_prefix(prefix.as_str())
                    .with_timeout(Duration::from_secs(*timeout_secs))
                    .with_pause(Duration::from_millis(*pause_ms));
                self.download(bucket, config).await
            }
            Commands::Ingest {
                source,
                table,
                catalog_dir,
                warehouse,
                write_mode,
                on_unmatched,
                cast_mode,
                partition_key,
                partition_pattern,
                batch_size,
                stringify,
            } => {
                let credentials = self.credentials()?;
                let table = load_table(catalog_dir.as_deref(), table)?;
                let target = table_storage(&table, warehouse.as_deref(), &credentials)?;
                let spec = match partition_pattern {
                    Some(pattern) => PartitionSpec::with_pattern(partition_key.as_str(), pattern)?,
                    None => PartitionSpec::new(partition_key.as_str())?,
                };
                let source = Storage::parse_with_credentials(source, &credentials)?;
                let write_mode = write_mode.unwrap_or_else(|| default_write_mode(&table.name));

                let config = IngestConfig::new(source, table, target)?
                    .with_partition_spec(spec)
                    .with_write_mode(write_mode)
                    .with_on_unmatched(*on_unmatched)
                    .with_cast_mode(*cast_mode)
                    .with_batch_size(*batch_size)
                    .with_stringify(*stringify);
                self.ingest(config).await
            }
            Commands::Silver {
                yellow_table,
                green_table,
                target_table,
                catalog_dir,
                warehouse,
            } => {
                let credentials = self.credentials()?;
                let catalog_dir = catalog_dir.as_deref();
                let warehouse = warehouse.as_deref();

                let source = |service, name: &str| -> Result<SilverSource> {
                    let table = load_table(catalog_dir, name)?;
                    let storage = table_storage(&table, warehouse, &credentials)?;
                    Ok(SilverSource::new(service, table, storage))
                };
                let yellow = source(ServiceType::Yellow, yellow_table)?;
                let green = source(ServiceType::Green, green_table)?;

                let target = load_table(catalog_dir, target_table)?;
                let target_storage = table_storage(&target, warehouse, &credentials)?;

                self.silver(SilverConfig::new(yellow, green, target, target_storage))
                    .await
            }
            Commands::Tables => self.tables(),
        }
    }

    /// Storage credentials from the secrets file, or none
    fn credentials(&self) -> Result<StorageCredentials> {
        match &self.cli.secrets_file {
            Some(path) => {
                debug!("Loading secrets from {}", path.display());
                StorageCredentials::from_file(path)
            }
            None => Ok(StorageCredentials::default()),
        }
    }

    async fn download(&self, bucket: &str, config: DownloadConfig) -> Result<Value> {
        config.validate()?;
        let credentials = self.credentials()?;
        let storage = Storage::parse_with_credentials(&bucket_url(bucket), &credentials)?;
        let downloader = Downloader::new(storage, config)?;

        let report = downloader.run().await?;
        let files: Vec<Value> = report
            .items
            .iter()
            .map(|item| {
                json!({
                    "file": item.file_name,
                    "success": item.success,
                    "skipped": item.skipped,
                    "error": item.error,
                })
            })
            .collect();

        Ok(json!({
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "files": files,
        }))
    }

    async fn ingest(&self, config: IngestConfig) -> Result<Value> {
        let table = config.table.name.clone();
        let report = Ingestor::new(config)?.run().await?;

        Ok(json!({
            "table": table,
            "partitions": report.partitions,
            "files_read": report.files_read,
            "files_written": report.files_written,
            "rows_written": report.rows_written,
            "duration_ms": report.duration_ms,
        }))
    }

    async fn silver(&self, config: SilverConfig) -> Result<Value> {
        let table = config.target.name.clone();
        let report = SilverJob::new(config)?.run().await?;
        let by_service: serde_json::Map<String, Value> = report
            .rows_by_service
            .iter()
            .map(|(service, rows)| (service.clone(), json!(rows)))
            .collect();

        Ok(json!({
            "table": table,
            "partitions": report.partitions,
            "rows_written": report.rows_written,
            "rows_by_service": by_service,
            "duration_ms": report.duration_ms,
        }))
    }

    fn tables(&self) -> Result<Value> {
        let tables = list_builtin()
            .into_iter()
            .map(|name| {
                let table = load_table(None, name)?;
                Ok(json!({
                    "name": table.name,
                    "description": table.description,
                    "partition_column": table.partition_column,
                    "ingestion_column": table.ingestion_column,
                    "columns": table.columns.len(),
                }))
            })
            .collect::<Result<Vec<Value>>>()?;

        Ok(json!({ "tables": tables }))
    }
}

/// Storage of a table, resolved against the warehouse
fn table_storage(
    table: &TableDefinition,
    warehouse: Option<&str>,
    credentials: &StorageCredentials,
) -> Result<Storage> {
    let location = table.resolve_location(warehouse)?;
    debug!("Table {} lives at {location}", table.name);
    Storage::parse_with_credentials(&location, credentials)
}

/// Write mode of the dataset feeding `table`, overwrite for other tables
pub(crate) fn default_write_mode(table: &str) -> WriteMode {
    DatasetKind::value_variants()
        .iter()
        .find(|kind| kind.bronze_table() == table)
        .map_or(WriteMode::default(), |kind| kind.default_write_mode())
}

/// A bare bucket name means an S3 bucket
pub(crate) fn bucket_url(bucket: &str) -> String {
    let is_path = bucket.contains("://")
        || bucket.starts_with('.')
        || Path::new(bucket).is_absolute();
    if is_path {
        bucket.to_string()
    } else {
        format!("s3://{bucket}")
    }
}

