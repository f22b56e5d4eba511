//! VirusTotal v3 reputation lookups for files (by content digest) and
//! links.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use modhub_core::error::AppError;
use modhub_entity::file::{FileUpload, ScanReport};

/// Per-request transport timeout. The hub applies its own overall bound.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Scanner name recorded in reports.
const SOURCE: &str = "virustotal";

/// Looks up `GET {base}/files/{sha256}` and `GET {base}/urls/{id}`.
///
/// A 404 on a file means the service has never seen it and yields an
/// `unknown` verdict; the upload itself is not kept, so it cannot be
/// submitted. A 404 on a link submits the link for analysis and also
/// yields `unknown`. Transport errors and other non-success statuses are
/// `UpstreamUnavailable`; nothing is retried here.
#[derive(Debug, Clone)]
pub struct VirusTotalScanner {
    /// HTTP client.
    client: reqwest::Client,
    /// API base URL without a trailing slash.
    base_url: String,
    /// API key sent as `x-apikey`.
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FileReportResponse {
    data: FileReportData,
}

#[derive(Debug, Deserialize)]
struct FileReportData {
    attributes: FileReportAttributes,
}

#[derive(Debug, Deserialize)]
struct FileReportAttributes {
    #[serde(default)]
    last_analysis_stats: AnalysisStats,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisStats {
    #[serde(default)]
    malicious: u32,
    #[serde(default)]
    suspicious: u32,
    #[serde(default)]
    harmless: u32,
    #[serde(default)]
    undetected: u32,
}

impl VirusTotalScanner {
    /// Creates a scanner for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Parses a file or link report body into a [`ScanReport`].
    fn parse_report(&self, body: &str) -> Result<ScanReport, AppError> {
        let response: FileReportResponse = serde_json::from_str(body).map_err(|e| {
            AppError::upstream_unavailable(format!("Malformed VirusTotal response: {e}"))
        })?;
        let stats = response.data.attributes.last_analysis_stats;
        Ok(ScanReport::from_counts(
            SOURCE,
            stats.malicious,
            stats.suspicious,
            stats.harmless,
            stats.undetected,
        ))
    }

    /// Sends an authenticated GET.
    async fn get(&self, url: &str) -> Result<reqwest::Response, AppError> {
        self.client
            .get(url)
            .header("x-apikey", &self.api_key)
            .send()
            .await
            .map_err(request_failed)
    }

    /// Reads a successful response body as a report.
    async fn read_report(&self, response: reqwest::Response) -> Result<ScanReport, AppError> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_unavailable(format!(
                "VirusTotal returned HTTP {status}"
            )));
        }
        let body = response.text().await.map_err(|e| {
            AppError::upstream_unavailable(format!("Failed to read VirusTotal response: {e}"))
        })?;
        self.parse_report(&body)
    }

    /// Queues `url` for analysis.
    async fn submit_url(&self, url: &str) -> Result<ScanReport, AppError> {
        let response = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await
            .map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_unavailable(format!(
                "VirusTotal rejected the link submission with HTTP {status}"
            )));
        }
        Ok(ScanReport::unknown(SOURCE)
            .with_summary("link submitted for analysis; scan again in a few seconds"))
    }
}

/// VirusTotal's link identifier: unpadded URL-safe base64 of the link.
fn url_id(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

fn request_failed(e: reqwest::Error) -> AppError {
    AppError::with_source(
        modhub_core::ErrorKind::UpstreamUnavailable,
        format!("VirusTotal request failed: {e}"),
        e,
    )
}

#[async_trait]
impl super::FileScanner for VirusTotalScanner {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn scan(&self, file: &FileUpload) -> Result<ScanReport, AppError> {
        let url = format!("{}/files/{}", self.base_url, file.sha256);
        debug!(file_id = %file.id, url = %url, "Querying VirusTotal");

        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ScanReport::unknown(SOURCE));
        }
        self.read_report(response).await
    }
}

#[async_trait]
impl super::UrlScanner for VirusTotalScanner {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn scan_url(&self, url: &str) -> Result<ScanReport, AppError> {
        let lookup = format!("{}/urls/{}", self.base_url, url_id(url));
        debug!(link = %url, "Querying VirusTotal");

        let response = self.get(&lookup).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return self.submit_url(url).await;
        }
        self.read_report(response).await
    }
}
