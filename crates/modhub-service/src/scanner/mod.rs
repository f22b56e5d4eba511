//! Content and file scanning capabilities.
//!
//! All are traits so the hub can be driven by test doubles; the defaults
//! are a keyword/sensitive-data/link matcher for text and a VirusTotal
//! lookup (or a local stand-in without an API key) for files and links.

pub mod keyword;
pub mod links;
pub mod local;
pub mod sensitive;
pub mod virustotal;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use modhub_core::config::ScannerConfig;
use modhub_core::error::AppError;
use modhub_entity::file::{FileUpload, ScanReport};
use modhub_entity::violation::MatchedTerm;

pub use keyword::KeywordScanner;
pub use local::LocalReputationScanner;
pub use virustotal::VirusTotalScanner;

/// Classification of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentVerdict {
    /// Nothing matched.
    Allowed,
    /// Soft match: deliver, but warn the author and audit.
    Flagged(Vec<MatchedTerm>),
    /// Hard match: do not deliver; record a violation.
    Blocked(Vec<MatchedTerm>),
    /// Contains links: deliver only once every link is vetted.
    Linked {
        /// Distinct links in order of appearance.
        urls: Vec<String>,
        /// Sensitive-data terms found outside the links.
        terms: Vec<MatchedTerm>,
    },
}

/// Classifies message text.
#[async_trait]
pub trait ContentScanner: Send + Sync + Debug {
    /// Scans `text`, which is already trimmed and non-empty.
    async fn scan(&self, text: &str) -> Result<ContentVerdict, AppError>;
}

/// Looks up a file's reputation.
#[async_trait]
pub trait FileScanner: Send + Sync + Debug {
    /// Short scanner name recorded in reports and logs.
    fn name(&self) -> &'static str;

    /// Scans `file`. Transport failures are `UpstreamUnavailable`.
    async fn scan(&self, file: &FileUpload) -> Result<ScanReport, AppError>;
}

/// Looks up a link's reputation.
#[async_trait]
pub trait UrlScanner: Send + Sync + Debug {
    /// Short scanner name recorded in reports and logs.
    fn name(&self) -> &'static str;

    /// Scans `url`. An `unknown` verdict means no conclusion yet.
    async fn scan_url(&self, url: &str) -> Result<ScanReport, AppError>;
}

/// Builds the link scanner for `config`, following the same rule as
/// [`build_file_scanner`].
pub fn build_url_scanner(config: &ScannerConfig) -> Result<Arc<dyn UrlScanner>, AppError> {
    match config.api_key() {
        Some(key) => Ok(Arc::new(VirusTotalScanner::new(
            &config.virustotal_base_url,
            key,
        )?)),
        None => Ok(Arc::new(LocalReputationScanner::new())),
    }
}

/// Builds the file scanner for `config`: VirusTotal when an API key is
/// configured, the local reputation stand-in otherwise.
pub fn build_file_scanner(config: &ScannerConfig) -> Result<Arc<dyn FileScanner>, AppError> {
    match config.api_key() {
        Some(key) => {
            info!(base_url = %config.virustotal_base_url, "Using VirusTotal file scanner");
            Ok(Arc::new(VirusTotalScanner::new(
                &config.virustotal_base_url,
                key,
            )?))
        }
        None => {
            info!("No VirusTotal API key configured, using local reputation scanner");
            Ok(Arc::new(LocalReputationScanner::new()))
        }
    }
}
