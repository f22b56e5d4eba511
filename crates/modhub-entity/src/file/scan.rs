//! Reputation scan result attached to a file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification returned by a file reputation scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanVerdict {
    /// No engine flagged the file.
    Clean,
    /// Some engines flagged it as suspicious, none as malicious.
    Suspicious,
    /// At least one engine flagged it as malicious.
    Malicious,
    /// The scanner has never seen this file.
    Unknown,
}

/// Structured scan result. Opaque to clients apart from the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Overall verdict.
    pub verdict: ScanVerdict,
    /// Engines reporting malicious.
    pub malicious: u32,
    /// Engines reporting suspicious.
    pub suspicious: u32,
    /// Engines reporting harmless.
    pub harmless: u32,
    /// Engines with no detection.
    pub undetected: u32,
    /// Which scanner produced the report.
    pub source: String,
    /// Human-readable summary.
    pub summary: String,
    /// When the scan completed.
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    /// Build a report from engine counts, deriving the verdict.
    pub fn from_counts(
        source: impl Into<String>,
        malicious: u32,
        suspicious: u32,
        harmless: u32,
        undetected: u32,
    ) -> Self {
        let verdict = if malicious > 0 {
            ScanVerdict::Malicious
        } else if suspicious > 0 {
            ScanVerdict::Suspicious
        } else {
            ScanVerdict::Clean
        };
        let total = malicious + suspicious + harmless + undetected;
        Self {
            verdict,
            malicious,
            suspicious,
            harmless,
            undetected,
            source: source.into(),
            summary: format!(
                "{malicious} malicious, {suspicious} suspicious of {total} engines"
            ),
            scanned_at: Utc::now(),
        }
    }

    /// A report for a file the scanner does not know.
    pub fn unknown(source: impl Into<String>) -> Self {
        Self {
            verdict: ScanVerdict::Unknown,
            malicious: 0,
            suspicious: 0,
            harmless: 0,
            undetected: 0,
            source: source.into(),
            summary: "file not known to the scanner".to_string(),
            scanned_at: Utc::now(),
        }
    }

    /// Replaces the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_counts() {
        assert_eq!(ScanReport::from_counts("t", 1, 5, 0, 60).verdict, ScanVerdict::Malicious);
        assert_eq!(ScanReport::from_counts("t", 0, 2, 0, 60).verdict, ScanVerdict::Suspicious);
        assert_eq!(ScanReport::from_counts("t", 0, 0, 10, 60).verdict, ScanVerdict::Clean);
    }

    #[test]
    fn test_summary_counts_engines() {
        let report = ScanReport::from_counts("t", 1, 2, 3, 4);
        assert_eq!(report.summary, "1 malicious, 2 suspicious of 10 engines");
    }
}
