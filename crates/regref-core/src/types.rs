use serde::{Deserialize, Serialize};

/// One physical page of the source document, with layout damage repaired.
///
/// Created once per page during extraction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// 1-based page number, unique and monotonically increasing.
    pub page: u32,
    /// Repaired plain text: de-hyphenated, line breaks flattened,
    /// whitespace runs collapsed.
    pub text: String,
    /// Targets of hyperlink annotations embedded in the page.
    /// Deduplicated; order carries no meaning.
    pub urls: Vec<String>,
}

/// The fixed set of pattern categories the detector scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    CircularCode,
    MasterCircular,
    RegulationSet,
    Regulation,
    ActSection,
    Schedule,
    Chapter,
    Clause,
    Url,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CircularCode => "circularCode",
            Self::MasterCircular => "masterCircular",
            Self::RegulationSet => "regulationSet",
            Self::Regulation => "regulation",
            Self::ActSection => "actSection",
            Self::Schedule => "schedule",
            Self::Chapter => "chapter",
            Self::Clause => "clause",
            Self::Url => "url",
        }
    }
}

/// A raw, unvalidated pattern hit with its page/sentence context.
///
/// Value object: two candidates with identical (page, kind, matched,
/// sentence) are the same hit and are collapsed during detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub page: u32,
    /// The sentence containing the match. Empty for page-level link hits.
    pub sentence: String,
    /// The exact substring that triggered detection.
    #[serde(rename = "match")]
    pub matched: String,
    pub kind: PatternKind,
    /// First URL found in the same sentence, if any. For page-level link
    /// candidates this equals `matched`.
    pub url: Option<String>,
}

/// Classification of a normalized reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    Circular,
    #[serde(rename = "Master Circular")]
    MasterCircular,
    Regulation,
    #[serde(rename = "Act Section")]
    ActSection,
    Schedule,
    Chapter,
    Clause,
    #[serde(rename = "Stock Exchange Circular")]
    StockExchangeCircular,
    #[serde(rename = "Depository Circular")]
    DepositoryCircular,
    #[serde(rename = "URL")]
    Url,
    Other,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circular => "Circular",
            Self::MasterCircular => "Master Circular",
            Self::Regulation => "Regulation",
            Self::ActSection => "Act Section",
            Self::Schedule => "Schedule",
            Self::Chapter => "Chapter",
            Self::Clause => "Clause",
            Self::StockExchangeCircular => "Stock Exchange Circular",
            Self::DepositoryCircular => "Depository Circular",
            Self::Url => "URL",
            Self::Other => "Other",
        }
    }
}

/// Maximum length of a single evidence snippet, in characters.
pub const MAX_SNIPPET_CHARS: usize = 200;

/// A normalized cross-reference with accumulated evidence.
///
/// Mutable only inside the merge step; treated as an immutable value
/// before and after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRecord {
    #[serde(rename = "type")]
    pub ref_type: RefType,
    /// Verbatim title as written in the source. Never fabricated.
    pub title: Option<String>,
    /// Precise code or number, e.g. a circular code or regulation number.
    pub identifier: Option<String>,
    pub url: Option<String>,
    /// Page number asserted by a URL fragment (`#page=N`), distinct from
    /// the pages the reference was observed on.
    pub anchor_page_hint: Option<u32>,
    /// All pages the reference was observed on. Sorted ascending, deduplicated,
    /// never empty for a valid record.
    pub pages: Vec<u32>,
    /// Exact quoted evidence, each at most [`MAX_SNIPPET_CHARS`] characters.
    /// Deduplicated, never empty for a valid record.
    pub snippets: Vec<String>,
    /// Certainty in [0, 1].
    pub confidence: f64,
}

impl ReferenceRecord {
    /// The identity under which records are deduplicated across pages:
    /// (type, identifier lower-cased or empty, title lower-cased or empty).
    pub fn merge_key(&self) -> MergeKey {
        MergeKey {
            ref_type: self.ref_type,
            identifier: self
                .identifier
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default(),
            title: self
                .title
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default(),
        }
    }
}

/// Identity of a logical reference for cross-page deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub ref_type: RefType,
    pub identifier: String,
    pub title: String,
}

/// Truncate a snippet to [`MAX_SNIPPET_CHARS`] characters on a char boundary.
pub fn clip_snippet(s: &str) -> String {
    if s.chars().count() <= MAX_SNIPPET_CHARS {
        s.to_string()
    } else {
        s.chars().take(MAX_SNIPPET_CHARS).collect()
    }
}
