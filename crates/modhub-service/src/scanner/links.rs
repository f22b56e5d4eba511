//! Link extraction.

use regex::Regex;

use modhub_core::error::AppError;

/// `http` and `https` links up to the next whitespace or quote.
const URL_PATTERN: &str = r#"(?i)\bhttps?://[^\s<>"'`]+"#;

/// Pulls links out of message text.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    /// Compiles the link pattern.
    pub fn new() -> Result<Self, AppError> {
        let pattern = Regex::new(URL_PATTERN)
            .map_err(|e| AppError::internal(format!("Invalid link pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// Distinct links in order of first appearance, without trailing
    /// sentence punctuation.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for found in self.pattern.find_iter(text) {
            let url = found
                .as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']']);
            if url.len() > "https://".len() && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<String> {
        LinkExtractor::new().expect("pattern compiles").extract(text)
    }

    #[test]
    fn test_extracts_distinct_links_in_order() {
        assert_eq!(
            extract("see https://example.com/a?b=1, then (http://docs.rs). again https://example.com/a?b=1"),
            vec!["https://example.com/a?b=1", "http://docs.rs"]
        );
    }

    #[test]
    fn test_ignores_text_without_scheme() {
        assert!(extract("visit example.com or ftp://host").is_empty());
        assert!(extract("just https:// nothing").is_empty());
    }
}
