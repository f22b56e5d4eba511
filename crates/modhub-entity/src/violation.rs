//! Policy violation entity.

use chrono::{DateTime, Utc};
use modhub_core::types::{UserId, ViolationId};
use serde::{Deserialize, Serialize};

/// Which rule family produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    /// A forbidden keyword. Hard block.
    Keyword,
    /// Card numbers, e-mail addresses and similar. Soft warning.
    SensitiveData,
}

/// How serious a match is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Low,
    /// Contact details and tax numbers.
    Medium,
    /// Payment cards, identity documents and forbidden keywords.
    High,
}

/// Kind of sensitive data a detector recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveDataKind {
    /// 16-digit payment card number.
    BankCard,
    /// E-mail address.
    Email,
    /// Russian phone number (`+7` or `8` prefix).
    Phone,
    /// Passport series and number.
    Passport,
    /// Taxpayer number (INN), 10 or 12 digits.
    Inn,
    /// Insurance number (SNILS).
    Snils,
}

impl SensitiveDataKind {
    /// Severity reported for matches of this kind.
    pub fn severity(self) -> Severity {
        match self {
            Self::BankCard | Self::Passport | Self::Snils => Severity::High,
            Self::Email | Self::Phone | Self::Inn => Severity::Medium,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::BankCard => "bank card number",
            Self::Email => "e-mail address",
            Self::Phone => "phone number",
            Self::Passport => "passport number",
            Self::Inn => "taxpayer number",
            Self::Snils => "insurance number",
        }
    }
}

/// One matched policy term, in the order it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTerm {
    /// The matched keyword, or a masked rendition of sensitive data.
    pub term: String,
    /// Rule family.
    pub category: TermCategory,
    /// Detector that matched, for sensitive data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SensitiveDataKind>,
    /// Severity of this match.
    pub severity: Severity,
}

impl MatchedTerm {
    /// A forbidden keyword match.
    pub fn keyword(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            category: TermCategory::Keyword,
            kind: None,
            severity: Severity::High,
        }
    }

    /// A sensitive-data match. `term` must already be masked.
    pub fn sensitive(kind: SensitiveDataKind, term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            category: TermCategory::SensitiveData,
            kind: Some(kind),
            severity: kind.severity(),
        }
    }

    /// Whether this is a sensitive-data match.
    pub fn is_sensitive(&self) -> bool {
        self.category == TermCategory::SensitiveData
    }
}

/// A blocked message kept for audit. Never deleted; only the reviewed
/// flag changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Unique violation identifier.
    pub id: ViolationId,
    /// Offending user.
    pub user_id: UserId,
    /// Offending user's username.
    pub username: String,
    /// Offending user's display name.
    pub display_name: String,
    /// Text of the blocked message.
    pub message_text: String,
    /// Matched terms, insertion order preserved.
    pub matched_terms: Vec<MatchedTerm>,
    /// Whether an admin has reviewed this entry.
    pub is_reviewed: bool,
    /// When the violation was recorded.
    pub created_at: DateTime<Utc>,
}

impl Violation {
    /// Category of the first matched term, `keyword` when none.
    pub fn violation_type(&self) -> TermCategory {
        self.matched_terms
            .first()
            .map(|t| t.category)
            .unwrap_or(TermCategory::Keyword)
    }
}
