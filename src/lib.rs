//! # taxi-lake
//!
//! Batch jobs that move the NYC TLC trip records through a small lake:
//! landing zone, bronze tables and a unified silver table.
//!
//! ## Jobs
//!
//! - **Download**: Fetch the monthly trip files into object storage, one
//!   `ano_mes_referencia=<YYYY-MM>` directory per month
//! - **Partition-Aligned Ingestion**: Discover partitions, align every file to
//!   a catalog table and write it with overwrite or append semantics
//! - **Silver Unification**: Merge yellow and green trips into one table with
//!   vendor and payment descriptions
//! - **Catalog**: YAML table definitions, built-in or from a directory
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taxi_lake::catalog::load_table;
//! use taxi_lake::ingest::{IngestConfig, Ingestor};
//! use taxi_lake::storage::Storage;
//!
//! #[tokio::main]
//! async fn main() -> taxi_lake::Result<()> {
//!     let table = load_table(None, "bronze_db.nyc_taxi_data_yellow")?;
//!     let target = Storage::parse(&table.resolve_location(Some("s3://lake"))?)?;
//!     let source = Storage::parse("s3://landing/nyc_taxi_data")?;
//!
//!     let report = Ingestor::new(IngestConfig::new(source, table, target)?)?
//!         .run()
//!         .await?;
//!     println!("{} rows written", report.rows_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ download │──▶│ landing zone │──▶│    ingest    │──▶│ bronze table │
//! └──────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                                             │
//!                                   ┌──────────────┐   ┌──────▼───────┐
//!                                   │ silver table │◀──│    silver    │
//!                                   └──────────────┘   └──────────────┘
//!
//! ┌───────────┬───────────┬──────────┬─────────┬─────────┐
//! │ partition │  schema   │  output  │ catalog │ storage │
//! ├───────────┼───────────┼──────────┼─────────┼─────────┤
//! │ Discovery │ Alignment │ Parquet  │ YAML    │ S3      │
//! │ Resolve   │ Casts     │ Sink     │ Builtin │ GCS/Az  │
//! │           │ Helpers   │          │         │ Local   │
//! └───────────┴───────────┴──────────┴─────────┴─────────┘
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::too_many_lines,
    clippy::unused_self,
    clippy::must_use_candidate,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::unused_async
)]

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Object store locations
pub mod storage;

/// Partition discovery
pub mod partition;

/// Schema alignment
pub mod schema;

/// Table definitions
pub mod catalog;

/// Parquet output
pub mod output;

/// Bronze ingestion
pub mod ingest;

/// Landing-zone download
pub mod download;

/// Silver trip table
pub mod silver;

/// Command-line interface
pub mod cli;

pub use error::{Error, Result};
pub use types::*;

pub use catalog::{load_table, TableDefinition};
pub use storage::Storage;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
