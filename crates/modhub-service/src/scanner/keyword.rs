//! Default content scanner: forbidden keywords and sensitive data.

use async_trait::async_trait;

use modhub_core::error::AppError;
use modhub_entity::violation::MatchedTerm;

use super::links::LinkExtractor;
use super::sensitive::SensitiveDataDetector;
use super::{ContentScanner, ContentVerdict};

/// Whole-word, case-insensitive keyword matcher with sensitive-data and
/// link detection.
///
/// Keyword hits block the message. Links send it through link review.
/// Sensitive data alone only flags it. Sensitive values are masked before
/// they leave the scanner.
#[derive(Debug, Clone)]
pub struct KeywordScanner {
    /// Lowercase, trimmed, non-empty, distinct keywords.
    keywords: Vec<String>,
    /// Card, e-mail, phone and document number detectors.
    sensitive: SensitiveDataDetector,
    /// Link extraction.
    links: LinkExtractor,
}

impl KeywordScanner {
    /// Creates a scanner for `keywords`. Blank and repeated entries are
    /// ignored.
    pub fn new<I, S>(keywords: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !list.contains(&keyword) {
                list.push(keyword);
            }
        }
        Ok(Self {
            keywords: list,
            sensitive: SensitiveDataDetector::new()?,
            links: LinkExtractor::new()?,
        })
    }

    /// Classifies `text` synchronously.
    pub fn classify(&self, text: &str) -> ContentVerdict {
        let lowered = text.to_lowercase();

        let mut keyword_hits: Vec<(usize, &str)> = self
            .keywords
            .iter()
            .filter_map(|k| find_whole_word(&lowered, k).map(|pos| (pos, k.as_str())))
            .collect();
        keyword_hits.sort_by_key(|(pos, _)| *pos);

        let mut terms: Vec<MatchedTerm> = keyword_hits
            .into_iter()
            .map(|(_, keyword)| MatchedTerm::keyword(keyword))
            .collect();
        let blocked = !terms.is_empty();

        let urls = self.links.extract(text);
        let mut scrubbed = text.to_string();
        for url in &urls {
            scrubbed = scrubbed.replace(url.as_str(), " ");
        }
        for sensitive in self.sensitive.detect(&scrubbed) {
            if !terms.iter().any(|t| t.term == sensitive.term) {
                terms.push(sensitive);
            }
        }

        if blocked {
            ContentVerdict::Blocked(terms)
        } else if !urls.is_empty() {
            ContentVerdict::Linked { urls, terms }
        } else if !terms.is_empty() {
            ContentVerdict::Flagged(terms)
        } else {
            ContentVerdict::Allowed
        }
    }
}

#[async_trait]
impl ContentScanner for KeywordScanner {
    async fn scan(&self, text: &str) -> Result<ContentVerdict, AppError> {
        Ok(self.classify(text))
    }
}

/// Byte offset of the first whole-word occurrence of `needle`.
fn find_whole_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).find_map(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        (before_ok && after_ok).then_some(start)
    })
}
