// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]

//! taxi-lake CLI
//!
//! Command-line interface for the download, ingest and silver jobs

use clap::Parser;
use taxi_lake::cli::{Cli, Runner};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
