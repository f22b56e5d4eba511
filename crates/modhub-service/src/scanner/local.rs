//! Deterministic local stand-in for the reputation service.

use async_trait::async_trait;

use modhub_core::error::AppError;
use modhub_entity::file::{FileUpload, ScanReport};

/// Engines the stand-in pretends to consult.
const ENGINES: u32 = 70;

/// Domains the stand-in treats as malicious.
const DANGEROUS_DOMAINS: &[&str] = &["malware.com", "phishing.test", "virus.test"];

/// Reports executables as suspicious, links to a handful of known-bad
/// domains as malicious, and everything else as clean.
#[derive(Debug, Clone, Default)]
pub struct LocalReputationScanner;

impl LocalReputationScanner {
    /// Creates the scanner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl super::FileScanner for LocalReputationScanner {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn scan(&self, file: &FileUpload) -> Result<ScanReport, AppError> {
        let name = super::FileScanner::name(self);
        let report = if file.file_type.eq_ignore_ascii_case("exe") {
            ScanReport::from_counts(name, 0, 2, 0, ENGINES - 2)
        } else {
            ScanReport::from_counts(name, 0, 0, 0, ENGINES)
        };
        Ok(report)
    }
}

#[async_trait]
impl super::UrlScanner for LocalReputationScanner {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn scan_url(&self, url: &str) -> Result<ScanReport, AppError> {
        let lowered = url.to_ascii_lowercase();
        let report = if DANGEROUS_DOMAINS.iter().any(|d| lowered.contains(d)) {
            ScanReport::from_counts(super::UrlScanner::name(self), 15, 5, 0, ENGINES - 20)
        } else {
            ScanReport::from_counts(super::UrlScanner::name(self), 0, 0, 0, ENGINES)
        };
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::UrlScanner;
    use modhub_entity::file::ScanVerdict;

    #[tokio::test]
    async fn test_known_bad_domains_are_malicious() {
        let scanner = LocalReputationScanner::new();
        let bad = scanner.scan_url("https://login.phishing.test/x").await.unwrap();
        assert_eq!(bad.verdict, ScanVerdict::Malicious);
        let good = scanner.scan_url("https://docs.rs").await.unwrap();
        assert_eq!(good.verdict, ScanVerdict::Clean);
    }
}
