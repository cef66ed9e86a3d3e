use std::future::Future;
use std::pin::Pin;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::{
    Candidate, MAX_SNIPPET_CHARS, PatternKind, RefType, ReferenceRecord, clip_snippet,
};

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("normalizer request failed: {0}")]
    Request(String),
    #[error("normalizer returned a payload that fails schema validation: {reason}: {payload}")]
    Schema { reason: String, payload: String },
    #[error("normalizer returned an empty payload")]
    Empty,
}

/// The injected normalization capability.
///
/// One operation: a batch of candidates in, schema-valid records out, or
/// an error. The rules-only and LLM-backed implementations are
/// interchangeable behind this trait; the pipeline never knows which one
/// it is driving.
pub trait Normalizer: Send + Sync {
    fn name(&self) -> &str;

    fn normalize<'a>(
        &'a self,
        batch: &'a [Candidate],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReferenceRecord>, NormalizeError>> + Send + 'a>>;
}

/// Fixed kind→type lookup used by the rules-only path.
pub fn kind_to_type(kind: PatternKind) -> RefType {
    match kind {
        PatternKind::MasterCircular => RefType::MasterCircular,
        PatternKind::CircularCode => RefType::Circular,
        PatternKind::Regulation | PatternKind::RegulationSet => RefType::Regulation,
        PatternKind::ActSection => RefType::ActSection,
        PatternKind::Schedule => RefType::Schedule,
        PatternKind::Chapter => RefType::Chapter,
        PatternKind::Clause => RefType::Clause,
        PatternKind::Url => RefType::Url,
    }
}

/// Confidence assigned to unreviewed pattern matches.
const RULES_CONFIDENCE: f64 = 0.4;

/// No-external-call fallback: maps each candidate straight to a record
/// via the fixed kind→type lookup.
///
/// Field discipline:
/// - `title` and `anchor_page_hint` are never set
/// - `identifier` for circular-code, regulation, and regulation-set kinds
///   (the match text), so distinct regulation sets keep distinct merge keys
/// - `url` is the match itself for url-kind candidates, else the
///   candidate's associated URL
/// - evidence is the sentence (match text when the sentence is empty)
/// - `confidence` fixed at [`RULES_CONFIDENCE`]
pub struct RulesNormalizer;

impl RulesNormalizer {
    fn record_for(candidate: &Candidate) -> ReferenceRecord {
        let identifier = match candidate.kind {
            PatternKind::CircularCode | PatternKind::Regulation | PatternKind::RegulationSet => {
                Some(candidate.matched.clone())
            }
            _ => None,
        };
        let url = if candidate.kind == PatternKind::Url {
            Some(candidate.matched.clone())
        } else {
            candidate.url.clone()
        };
        let snippet = if candidate.sentence.is_empty() {
            clip_snippet(&candidate.matched)
        } else {
            clip_snippet(&candidate.sentence)
        };
        ReferenceRecord {
            ref_type: kind_to_type(candidate.kind),
            title: None,
            identifier,
            url,
            anchor_page_hint: None,
            pages: vec![candidate.page],
            snippets: vec![snippet],
            confidence: RULES_CONFIDENCE,
        }
    }
}

impl Normalizer for RulesNormalizer {
    fn name(&self) -> &str {
        "rules"
    }

    fn normalize<'a>(
        &'a self,
        batch: &'a [Candidate],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReferenceRecord>, NormalizeError>> + Send + 'a>>
    {
        let records: Vec<ReferenceRecord> = batch.iter().map(Self::record_for).collect();
        Box::pin(async move { Ok(records) })
    }
}

/// Fail-closed schema validation at the normalizer boundary.
///
/// Any violation rejects the whole payload; no best-effort coercion, which
/// would undermine the never-fabricate invariant. `payload_for_error` is
/// the raw collaborator output, truncated into the error for debugging.
pub fn validate_records(
    records: &[ReferenceRecord],
    payload_for_error: &str,
) -> Result<(), NormalizeError> {
    for record in records {
        let reason = if record.pages.is_empty() {
            Some("empty pages".to_string())
        } else if record.snippets.is_empty() {
            Some("empty snippets".to_string())
        } else if !(0.0..=1.0).contains(&record.confidence) {
            Some(format!("confidence {} out of [0,1]", record.confidence))
        } else if let Some(s) = record
            .snippets
            .iter()
            .find(|s| s.chars().count() > MAX_SNIPPET_CHARS)
        {
            Some(format!(
                "snippet exceeds {} chars ({} chars)",
                MAX_SNIPPET_CHARS,
                s.chars().count()
            ))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(NormalizeError::Schema {
                reason,
                payload: truncate_payload(payload_for_error),
            });
        }
    }
    Ok(())
}

/// Cap the offending payload carried inside error messages.
pub fn truncate_payload(payload: &str) -> String {
    const MAX: usize = 400;
    if payload.chars().count() <= MAX {
        payload.to_string()
    } else {
        let head: String = payload.chars().take(MAX).collect();
        format!("{}…", head)
    }
}

/// Parse the page number asserted by a URL fragment.
///
/// Only the documented `#page=N` suffix is recognized; other anchor
/// formats are deliberately not guessed. Applied at the LLM normalizer
/// boundary, never in the rules-only path.
pub fn anchor_page_hint(url: &str) -> Option<u32> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#page=(\d+)$").unwrap());
    RE.captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: PatternKind, matched: &str, sentence: &str) -> Candidate {
        Candidate {
            page: 1,
            sentence: sentence.to_string(),
            matched: matched.to_string(),
            kind,
            url: None,
        }
    }

    #[tokio::test]
    async fn test_rules_never_sets_title_or_anchor() {
        let batch = vec![
            candidate(PatternKind::CircularCode, "SEBI/HO/CIR/2023/45", "s1"),
            candidate(PatternKind::MasterCircular, "Master Circular for Depositories", "s2"),
            candidate(PatternKind::Url, "https://example.gov/x#page=4", ""),
        ];
        let records = RulesNormalizer.normalize(&batch).await.unwrap();
        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.title.is_none());
            assert!(record.anchor_page_hint.is_none());
            assert_eq!(record.confidence, 0.4);
        }
    }

    #[tokio::test]
    async fn test_rules_identifier_discipline() {
        let batch = vec![
            candidate(PatternKind::CircularCode, "SEBI/HO/CIR/2023/45", "s"),
            candidate(PatternKind::Regulation, "Regulation 9(1)", "s"),
            candidate(PatternKind::RegulationSet, "SEBI (LODR) Regulations, 2015", "s"),
            candidate(PatternKind::Schedule, "Schedule III", "s"),
        ];
        let records = RulesNormalizer.normalize(&batch).await.unwrap();
        assert_eq!(records[0].identifier.as_deref(), Some("SEBI/HO/CIR/2023/45"));
        assert_eq!(records[1].identifier.as_deref(), Some("Regulation 9(1)"));
        assert_eq!(
            records[2].identifier.as_deref(),
            Some("SEBI (LODR) Regulations, 2015")
        );
        assert!(records[3].identifier.is_none());
    }

    #[tokio::test]
    async fn test_rules_url_and_snippet_for_page_link() {
        let batch = vec![candidate(PatternKind::Url, "https://example.gov/doc", "")];
        let records = RulesNormalizer.normalize(&batch).await.unwrap();
        assert_eq!(records[0].ref_type, RefType::Url);
        assert_eq!(records[0].url.as_deref(), Some("https://example.gov/doc"));
        // Empty sentence: the match text stands in as evidence
        assert_eq!(records[0].snippets, vec!["https://example.gov/doc"]);
    }

    #[tokio::test]
    async fn test_rules_associated_url_carried() {
        let mut cand = candidate(PatternKind::Regulation, "Regulation 4", "see the site");
        cand.url = Some("https://example.gov/reg4".to_string());
        let records = RulesNormalizer.normalize(&[cand]).await.unwrap();
        assert_eq!(records[0].url.as_deref(), Some("https://example.gov/reg4"));
    }

    #[tokio::test]
    async fn test_rules_snippet_clipped() {
        let long_sentence = "x".repeat(500);
        let cand = candidate(PatternKind::Clause, "Clause 2", &long_sentence);
        let records = RulesNormalizer.normalize(&[cand]).await.unwrap();
        assert_eq!(records[0].snippets[0].chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn test_kind_to_type_lookup() {
        assert_eq!(kind_to_type(PatternKind::MasterCircular), RefType::MasterCircular);
        assert_eq!(kind_to_type(PatternKind::CircularCode), RefType::Circular);
        assert_eq!(kind_to_type(PatternKind::RegulationSet), RefType::Regulation);
        assert_eq!(kind_to_type(PatternKind::Url), RefType::Url);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let good = ReferenceRecord {
            ref_type: RefType::Circular,
            title: None,
            identifier: Some("X/CIR/2020/1".into()),
            url: None,
            anchor_page_hint: None,
            pages: vec![1],
            snippets: vec!["ok".into()],
            confidence: 0.5,
        };
        assert!(validate_records(&[good.clone()], "{}").is_ok());

        let mut empty_pages = good.clone();
        empty_pages.pages.clear();
        assert!(matches!(
            validate_records(&[empty_pages], "{}"),
            Err(NormalizeError::Schema { .. })
        ));

        let mut bad_confidence = good.clone();
        bad_confidence.confidence = 1.5;
        assert!(validate_records(&[bad_confidence], "{}").is_err());

        let mut long_snippet = good;
        long_snippet.snippets = vec!["y".repeat(MAX_SNIPPET_CHARS + 1)];
        assert!(validate_records(&[long_snippet], "{}").is_err());
    }

    #[test]
    fn test_error_payload_truncated() {
        let payload = "p".repeat(1000);
        let truncated = truncate_payload(&payload);
        assert!(truncated.chars().count() <= 401);
    }

    #[test]
    fn test_anchor_page_hint() {
        assert_eq!(anchor_page_hint("https://example.gov/doc.pdf#page=12"), Some(12));
        assert_eq!(anchor_page_hint("https://example.gov/doc.pdf"), None);
        // Only the documented format; no guessing
        assert_eq!(anchor_page_hint("https://example.gov/doc.pdf#p12"), None);
        assert_eq!(anchor_page_hint("https://example.gov/doc.pdf#page=12&zoom=2"), None);
    }
}
