//! CLI commands and argument parsing

use crate::download::{DEFAULT_BASE_URL, DEFAULT_PREFIX};
use crate::ingest::DEFAULT_BATCH_SIZE;
use crate::partition::DEFAULT_PARTITION_KEY;
use crate::types::{CastMode, DatasetKind, UnmatchedPathPolicy, WriteMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Batch jobs of the NYC taxi trip lake
#[derive(Parser, Debug)]
#[command(name = "taxi-lake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Secrets file (JSON) with storage credentials
    #[arg(long, global = true)]
    pub secrets_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download monthly trip files into the landing zone
    Download {
        /// Dataset category
        #[arg(value_enum)]
        dataset: DatasetKind,

        /// First month (YYYY-MM); omit for a full load since 2009-01
        start_month: Option<String>,

        /// Last month (YYYY-MM); defaults to the first month
        end_month: Option<String>,

        /// Destination bucket name or storage URL
        #[arg(long)]
        bucket: String,

        /// Key prefix inside the bucket
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Base URL of the published files
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Pause between downloads in milliseconds
        #[arg(long, default_value = "1000")]
        pause_ms: u64,
    },

    /// Ingest a landing location into a bronze table
    Ingest {
        /// Landing location (storage URL)
        #[arg(long)]
        source: String,

        /// Target table (`<db>.<table>` or path to a YAML file)
        #[arg(long)]
        table: String,

        /// Directory with table definitions
        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Warehouse root for tables without a location
        #[arg(long)]
        warehouse: Option<String>,

        /// Write mode; defaults to append for the high-volume table and
        /// overwrite-partition otherwise
        #[arg(long, value_enum)]
        write_mode: Option<WriteMode>,

        /// What to do with files outside any partition
        #[arg(long, value_enum, default_value_t = UnmatchedPathPolicy::Skip)]
        on_unmatched: UnmatchedPathPolicy,

        /// Behavior of values that fail to cast
        #[arg(long, value_enum, default_value_t = CastMode::Lossy)]
        cast_mode: CastMode,

        /// Partition key in source paths
        #[arg(long, default_value = DEFAULT_PARTITION_KEY)]
        partition_key: String,

        /// Regex the partition value must match
        #[arg(long)]
        partition_pattern: Option<String>,

        /// Rows per read chunk
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Land every source column as string before alignment
        #[arg(long)]
        stringify: bool,
    },

    /// Rebuild the silver trip table from the bronze yellow and green tables
    Silver {
        /// Bronze yellow table
        #[arg(long, default_value = "bronze_db.nyc_taxi_data_yellow")]
        yellow_table: String,

        /// Bronze green table
        #[arg(long, default_value = "bronze_db.nyc_taxi_data_green")]
        green_table: String,

        /// Silver table
        #[arg(long, default_value = "silver_db.tb_corrida_taxi_ny")]
        target_table: String,

        /// Directory with table definitions
        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Warehouse root for tables without a location
        #[arg(long)]
        warehouse: Option<String>,
    },

    /// List built-in table definitions
    Tables,
}
