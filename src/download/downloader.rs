//! Sequential HTTP-to-object-store transfer

use super::months::resolve_months;
use super::types::{DownloadConfig, DownloadItem, DownloadReport};
use crate::error::{Error, Result};
use crate::partition::DEFAULT_PARTITION_KEY;
use crate::storage::{join_key, Storage};
use bytes::Bytes;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Outcome of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Object already existed; nothing was fetched
    Skipped,
    /// Object fetched and stored
    Downloaded {
        /// Bytes stored
        bytes: usize,
    },
}

/// Downloads published monthly files into a landing zone
#[derive(Debug)]
pub struct Downloader {
    client: Client,
    storage: Storage,
    config: DownloadConfig,
}

impl Downloader {
    /// Validate the config and build the HTTP client
    pub fn new(storage: Storage, config: DownloadConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            storage,
            config,
        })
    }

    /// Landing key of one month's file, relative to the storage root
    pub fn landing_key(&self, month: &str) -> String {
        join_key(
            &self.config.prefix,
            &format!(
                "{DEFAULT_PARTITION_KEY}={month}/{}",
                self.config.kind.file_name(month)
            ),
        )
    }

    /// Resolve the configured months and download them
    ///
    /// The month range is validated before the first request.
    pub async fn run(&self) -> Result<DownloadReport> {
        let months = resolve_months(
            self.config.start_month.as_deref(),
            self.config.end_month.as_deref(),
            Utc::now().date_naive(),
        )?;
        info!(
            "Downloading {} {} files ({} to {}) into {}",
            months.len(),
            self.config.kind,
            months.first().map_or("-", String::as_str),
            months.last().map_or("-", String::as_str),
            self.storage
        );

        let report = self.download_dataset(&months).await;
        info!(
            "Download finished: {} succeeded ({} already present), {} failed",
            report.succeeded(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Download one file per month, one after another
    ///
    /// A failing month is logged and recorded; the remaining months are
    /// still attempted.
    pub async fn download_dataset(&self, months: &[String]) -> DownloadReport {
        let mut report = DownloadReport::default();

        for (idx, month) in months.iter().enumerate() {
            if idx > 0 && !self.config.pause.is_zero() {
                tokio::time::sleep(self.config.pause).await;
            }

            let file_name = self.config.kind.file_name(month);
            let url = self.config.file_url(&file_name);
            let key = self.landing_key(month);

            let item = match self.download_to_storage(&url, &key).await {
                Ok(outcome) => DownloadItem {
                    file_name,
                    success: true,
                    skipped: outcome == TransferOutcome::Skipped,
                    error: None,
                },
                Err(e) => {
                    warn!("Failed to download {file_name}: {e}");
                    DownloadItem {
                        file_name,
                        success: false,
                        skipped: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.items.push(item);
        }

        report
    }

    /// Fetch `url` into `key` unless an object already exists there
    pub async fn download_to_storage(&self, url: &str, key: &str) -> Result<TransferOutcome> {
        if self.storage.exists(key).await? {
            info!("{key} already exists, skipping");
            return Ok(TransferOutcome::Skipped);
        }

        debug!("GET {url}");
        let data = self.fetch(url).await?;
        let bytes = data.len();
        let location = self.storage.put(key, data).await?;
        info!("Stored {bytes} bytes at {location}");

        Ok(TransferOutcome::Downloaded { bytes })
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transfer_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transfer_error(e))?
        {
            buffer.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(buffer))
    }

    fn transfer_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = self.config.timeout.as_millis() as u64;
            Error::Timeout { timeout_ms }
        } else {
            Error::Http(error)
        }
    }
}
