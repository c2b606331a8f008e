//! Landing-zone download
//!
//! Fetches the published monthly trip files of one dataset into object
//! storage under `<prefix>/ano_mes_referencia=<YYYY-MM>/`.

mod downloader;
mod months;
mod types;

pub use downloader::{Downloader, TransferOutcome};
pub use months::{month_range, resolve_months, Month, FIRST_AVAILABLE_MONTH};
pub use types::{DownloadConfig, DownloadItem, DownloadReport, DEFAULT_BASE_URL, DEFAULT_PREFIX};

#[cfg(test)]
mod tests;
