//! Sensitive-data detectors.
//!
//! Each detector is a regular expression for one [`SensitiveDataKind`].
//! Detectors run in priority order and a later detector never claims text
//! an earlier one already matched, so a card number is not also reported
//! as a passport number.

use regex::{Captures, Regex};

use modhub_core::error::AppError;
use modhub_entity::violation::{MatchedTerm, SensitiveDataKind};

/// Detectors in priority order.
const PATTERNS: &[(SensitiveDataKind, &str)] = &[
    (
        SensitiveDataKind::BankCard,
        r"\b[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}[\s-]?[0-9]{4}\b",
    ),
    (
        SensitiveDataKind::Email,
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    ),
    (
        SensitiveDataKind::Phone,
        r"(?:\+7|\b8)[\s-]?\(?([0-9]{3})\)?[\s-]?([0-9]{3})[\s-]?([0-9]{2})[\s-]?([0-9]{2})\b",
    ),
    (
        SensitiveDataKind::Passport,
        r"\b[0-9]{4}[\s-]?[0-9]{6}\b",
    ),
    (SensitiveDataKind::Inn, r"\b[0-9]{10}(?:[0-9]{2})?\b"),
    (
        SensitiveDataKind::Snils,
        r"\b[0-9]{3}[\s-]?[0-9]{3}[\s-]?[0-9]{3}[\s-]?[0-9]{2}\b",
    ),
];

#[derive(Debug, Clone)]
struct Detector {
    kind: SensitiveDataKind,
    pattern: Regex,
}

/// Finds and masks sensitive data in message text.
#[derive(Debug, Clone)]
pub struct SensitiveDataDetector {
    detectors: Vec<Detector>,
}

impl SensitiveDataDetector {
    /// Compiles the detector set.
    pub fn new() -> Result<Self, AppError> {
        let detectors = PATTERNS
            .iter()
            .map(|(kind, pattern)| {
                Regex::new(pattern)
                    .map(|pattern| Detector {
                        kind: *kind,
                        pattern,
                    })
                    .map_err(|e| {
                        AppError::internal(format!("Invalid {kind:?} detector pattern: {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { detectors })
    }

    /// Masked matches in order of appearance.
    pub fn detect(&self, text: &str) -> Vec<MatchedTerm> {
        let mut claimed: Vec<(usize, usize, MatchedTerm)> = Vec::new();
        for detector in &self.detectors {
            for caps in detector.pattern.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let (start, end) = (whole.start(), whole.end());
                if claimed.iter().any(|(s, e, _)| start < *e && *s < end) {
                    continue;
                }
                let masked = mask(detector.kind, &caps);
                claimed.push((start, end, MatchedTerm::sensitive(detector.kind, masked)));
            }
        }
        claimed.sort_by_key(|(start, _, _)| *start);

        let mut terms: Vec<MatchedTerm> = Vec::with_capacity(claimed.len());
        for (_, _, term) in claimed {
            if !terms.iter().any(|t| t.term == term.term) {
                terms.push(term);
            }
        }
        terms
    }
}

fn mask(kind: SensitiveDataKind, caps: &Captures<'_>) -> String {
    let value = caps.get(0).map_or("", |m| m.as_str());
    match kind {
        SensitiveDataKind::BankCard => {
            let digits: String = value.chars().filter(char::is_ascii_digit).collect();
            format!("****-****-****-{}", &digits[digits.len().saturating_sub(4)..])
        }
        SensitiveDataKind::Email => match value.split_once('@') {
            Some((local, domain)) => {
                let mut chars = local.chars();
                let first = chars.next().unwrap_or('*');
                format!("{first}{}@{domain}", "*".repeat(chars.count()))
            }
            None => "*".repeat(value.len()),
        },
        SensitiveDataKind::Phone => {
            let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            let formatted = format!("+7 ({}) {}-{}-{}", group(1), group(2), group(3), group(4));
            mask_digits_keeping_last(&formatted, 2)
        }
        SensitiveDataKind::Passport | SensitiveDataKind::Inn | SensitiveDataKind::Snils => {
            mask_digits_keeping_last(value, 0)
        }
    }
}

/// Replaces every ASCII digit except the last `keep` with `*`.
fn mask_digits_keeping_last(value: &str, keep: usize) -> String {
    let total = value.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen + keep <= total { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}
