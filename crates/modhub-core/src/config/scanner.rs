//! External file reputation scanner configuration.

use serde::{Deserialize, Serialize};

/// File reputation scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// VirusTotal API key. When absent the local reputation scanner is used.
    #[serde(default)]
    pub virustotal_api_key: Option<String>,
    /// VirusTotal v3 API base URL.
    #[serde(default = "default_virustotal_base_url")]
    pub virustotal_base_url: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            virustotal_api_key: None,
            virustotal_base_url: default_virustotal_base_url(),
        }
    }
}

impl ScannerConfig {
    /// The configured API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.virustotal_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn default_virustotal_base_url() -> String {
    "https://www.virustotal.com/api/v3".to_string()
}
