//! Tests for download module

use super::*;
use crate::error::Error;
use crate::storage::Storage;
use crate::types::DatasetKind;
use bytes::Bytes;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, kind: DatasetKind) -> DownloadConfig {
    DownloadConfig::new(kind)
        .with_base_url(server.uri())
        .with_pause(Duration::ZERO)
}

// ============================================================================
// Month Tests
// ============================================================================

#[test]
fn test_month_range_inclusive() {
    assert_eq!(
        month_range("2022-11", "2023-02").unwrap(),
        vec!["2022-11", "2022-12", "2023-01", "2023-02"]
    );
    assert_eq!(month_range("2023-05", "2023-05").unwrap(), vec!["2023-05"]);
}

#[test]
fn test_month_range_start_after_end() {
    let err = month_range("2023-05", "2023-01").unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("2023-05"));
}

#[test_case("2023-1" ; "single digit month")]
#[test_case("2023-13" ; "month out of range")]
#[test_case("2023-00" ; "month zero")]
#[test_case("23-01" ; "short year")]
#[test_case("2023/01" ; "wrong separator")]
#[test_case("" ; "empty")]
fn test_invalid_month(value: &str) {
    let err = value.parse::<Month>().unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_resolve_months() {
    let today = NaiveDate::from_ymd_opt(2009, 3, 15).unwrap();

    assert_eq!(
        resolve_months(Some("2023-01"), None, today).unwrap(),
        vec!["2023-01"]
    );
    assert_eq!(
        resolve_months(None, None, today).unwrap(),
        vec!["2009-01", "2009-02", "2009-03"]
    );
    assert!(resolve_months(None, Some("2023-01"), today)
        .unwrap_err()
        .is_config());
}

#[test]
fn test_full_load_starts_in_2009() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let months = resolve_months(None, None, today).unwrap();
    assert_eq!(months.first().map(String::as_str), Some("2009-01"));
    assert_eq!(months.last().map(String::as_str), Some("2024-06"));
    assert_eq!(months.len(), 15 * 12 + 6);
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = DownloadConfig::new(DatasetKind::Yellow);
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.prefix, "nyc_taxi_data");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.pause, Duration::from_secs(1));
    assert_eq!(
        config.file_url("yellow_tripdata_2023-01.parquet"),
        "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_2023-01.parquet"
    );
}

#[test]
fn test_config_validation() {
    let bad_url = DownloadConfig::new(DatasetKind::Green).with_base_url("not a url");
    assert!(bad_url.validate().unwrap_err().is_config());

    let bad_scheme = DownloadConfig::new(DatasetKind::Green).with_base_url("ftp://host/data");
    assert!(bad_scheme.validate().unwrap_err().is_config());

    let zero_timeout = DownloadConfig::new(DatasetKind::Green).with_timeout(Duration::ZERO);
    assert!(zero_timeout.validate().is_err());

    let reversed = DownloadConfig::new(DatasetKind::Green)
        .with_months(Some("2023-05".into()), Some("2023-01".into()));
    assert!(matches!(
        reversed.validate().unwrap_err(),
        Error::InvalidMonthRange { .. }
    ));

    let end_only = DownloadConfig::new(DatasetKind::Green).with_months(None, Some("2023-01".into()));
    assert!(end_only.validate().unwrap_err().is_config());
}

#[test]
fn test_landing_key() {
    let downloader = Downloader::new(
        Storage::in_memory(),
        DownloadConfig::new(DatasetKind::Highvolumeforhire),
    )
    .unwrap();
    assert_eq!(
        downloader.landing_key("2023-01"),
        "nyc_taxi_data/ano_mes_referencia=2023-01/fhvhv_tripdata_2023-01.parquet"
    );
}

// ============================================================================
// Transfer Tests
// ============================================================================

#[tokio::test]
async fn test_download_to_storage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/yellow_tripdata_2023-01.parquet"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PAR1data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    let downloader = Downloader::new(storage.clone(), config(&server, DatasetKind::Yellow)).unwrap();
    let url = format!("{}/yellow_tripdata_2023-01.parquet", server.uri());

    let outcome = downloader.download_to_storage(&url, "a/b.parquet").await.unwrap();
    assert_eq!(outcome, TransferOutcome::Downloaded { bytes: 8 });

    let stored = storage.get(&storage.path("a/b.parquet")).await.unwrap();
    assert_eq!(stored, Bytes::from_static(b"PAR1data"));

    // Second call finds the object and does not hit the server again
    let outcome = downloader.download_to_storage(&url, "a/b.parquet").await.unwrap();
    assert_eq!(outcome, TransferOutcome::Skipped);
}

#[tokio::test]
async fn test_download_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    let downloader = Downloader::new(storage.clone(), config(&server, DatasetKind::Green)).unwrap();
    let url = format!("{}/missing.parquet", server.uri());

    let err = downloader.download_to_storage(&url, "missing.parquet").await.unwrap_err();
    assert!(matches!(err, crate::error::Error::HttpStatus { status: 404, .. }));
    assert!(!storage.exists("missing.parquet").await.unwrap());
}

#[tokio::test]
async fn test_download_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let downloader = Downloader::new(
        Storage::in_memory(),
        config(&server, DatasetKind::Green).with_timeout(Duration::from_millis(100)),
    )
    .unwrap();
    let url = format!("{}/slow.parquet", server.uri());

    let err = downloader.download_to_storage(&url, "slow.parquet").await.unwrap_err();
    assert!(matches!(err, crate::error::Error::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn test_partial_failure_continues() {
    let server = MockServer::start().await;
    for (month, status) in [("2023-01", 200), ("2023-02", 500), ("2023-03", 200)] {
        Mock::given(method("GET"))
            .and(path(format!("/yellow_tripdata_{month}.parquet")))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(month.as_bytes().to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let storage = Storage::in_memory();
    let downloader = Downloader::new(
        storage.clone(),
        config(&server, DatasetKind::Yellow)
            .with_months(Some("2023-01".into()), Some("2023-03".into())),
    )
    .unwrap();

    let report = downloader.run().await.unwrap();
    assert_eq!(
        report.results(),
        vec![
            ("yellow_tripdata_2023-01.parquet", true),
            ("yellow_tripdata_2023-02.parquet", false),
            ("yellow_tripdata_2023-03.parquet", true),
        ]
    );
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    assert!(report.items[1].error.as_deref().unwrap_or_default().contains("500"));

    let stored = storage.list("nyc_taxi_data", ".parquet").await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_invalid_range_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Downloader::new(
        Storage::in_memory(),
        config(&server, DatasetKind::Yellow)
            .with_months(Some("2023-05".into()), Some("2023-01".into())),
    )
    .unwrap_err();
    assert!(err.is_config());
}
