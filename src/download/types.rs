//! Download configuration and report types

use super::months::resolve_months;
use crate::error::{Error, Result};
use crate::types::DatasetKind;
use chrono::Utc;
use std::time::Duration;
use url::Url;

/// Public trip-record file host
pub const DEFAULT_BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";

/// Landing prefix inside the bucket
pub const DEFAULT_PREFIX: &str = "nyc_taxi_data";

/// Configuration of one download run
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Dataset category
    pub kind: DatasetKind,
    /// First month, `YYYY-MM`
    pub start_month: Option<String>,
    /// Last month, `YYYY-MM`
    pub end_month: Option<String>,
    /// Base URL the file names are appended to
    pub base_url: String,
    /// Key prefix of the landing zone
    pub prefix: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause between two downloads
    pub pause: Duration,
    /// User agent string
    pub user_agent: String,
}

impl DownloadConfig {
    /// Create a config with the default host, prefix and timings
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            start_month: None,
            end_month: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            timeout: Duration::from_secs(30),
            pause: Duration::from_secs(1),
            user_agent: format!("taxi-lake/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the month range
    #[must_use]
    pub fn with_months(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_month = start;
        self.end_month = end;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the landing prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between downloads
    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Check everything that can be checked without network access
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }

        if self.timeout.is_zero() {
            return Err(Error::invalid_value("timeout", "must be greater than zero"));
        }

        resolve_months(
            self.start_month.as_deref(),
            self.end_month.as_deref(),
            Utc::now().date_naive(),
        )?;
        Ok(())
    }

    /// URL of one published file
    pub fn file_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_url.trim_end_matches('/'))
    }
}

/// Result of one downloaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    /// Published file name
    pub file_name: String,
    /// Whether the file is in storage after the run
    pub success: bool,
    /// The file was already present and was not fetched again
    pub skipped: bool,
    /// Error message of a failed item
    pub error: Option<String>,
}

/// Per-file outcome of a download run, in month order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Items in the order they were attempted
    pub items: Vec<DownloadItem>,
}

impl DownloadReport {
    /// `(file name, success)` pairs
    pub fn results(&self) -> Vec<(&str, bool)> {
        self.items
            .iter()
            .map(|item| (item.file_name.as_str(), item.success))
            .collect()
    }

    /// Number of files present after the run
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.success).count()
    }

    /// Number of failed files
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Number of files that already existed
    pub fn skipped(&self) -> usize {
        self.items.iter().filter(|item| item.skipped).count()
    }

    /// True when no item failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}
