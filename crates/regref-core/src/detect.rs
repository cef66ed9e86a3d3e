use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::segment::split_sentences;
use crate::types::{Candidate, PageRecord, PatternKind};

/// The fixed pattern table: one compiled matcher per [`PatternKind`].
///
/// Patterns are applied independently to every sentence; a single sentence
/// may yield candidates of several kinds.
static PATTERNS: Lazy<Vec<(PatternKind, Regex)>> = Lazy::new(|| {
    vec![
        // Agency-prefixed path with a CIR marker and year/sequence,
        // e.g. SEBI/HO/MRD/DSA/CIR/2023/45 or NSDL/POLICY/CIR/2022/089
        (
            PatternKind::CircularCode,
            Regex::new(r"\b[A-Z]{2,}(?:/[A-Z0-9.\-]+)*?/CIR(?:/[A-Z0-9.\-]+)*?/\d{4}/\d+\b")
                .unwrap(),
        ),
        // "Master Circular for/on <Title>", optionally trailing a dated clause
        (
            PatternKind::MasterCircular,
            Regex::new(
                r"Master Circular\s+(?:for|on)\s+(?:[A-Z][A-Za-z&()\- ]*?\s+dated\s+[A-Za-z]+\s+\d{1,2},\s+\d{4}|[A-Z][A-Za-z&()\- ]{2,100})",
            )
            .unwrap(),
        ),
        // "<Agency> (<parenthetical>) Regulations, <year>". The leading
        // words must be capitalized (connectors and/of allowed) so prose
        // before the agency name is not swallowed into the match.
        (
            PatternKind::RegulationSet,
            Regex::new(
                r"\b[A-Z][A-Za-z]*(?:\s+(?:[A-Z][A-Za-z]*|and|of))*\s+\([^)]{2,100}\)\s+Regulations,?\s+\d{4}\b",
            )
            .unwrap(),
        ),
        // "Regulation(s) N", with optional parenthetical sub-clauses and
        // conjunction lists ("Regulation 12(3) and 12(3A)"); lists are
        // expanded into one candidate per item, see expand_regulation_list.
        (
            PatternKind::Regulation,
            Regex::new(
                r"\bRegulations?\s+(\d+[A-Z]{0,2}(?:\([0-9A-Za-z]{1,4}\))*(?:\s*(?:,|and|&)\s*\d+[A-Z]{0,2}(?:\([0-9A-Za-z]{1,4}\))*)*)",
            )
            .unwrap(),
        ),
        // "Section N ... of the ... Act, <year>"
        (
            PatternKind::ActSection,
            Regex::new(
                r"\bSections?\s+\d+[A-Z]{0,2}(?:\([0-9A-Za-z]{1,4}\))*(?:\s*(?:,|and|&)\s*\d+[A-Z]{0,2}(?:\([0-9A-Za-z]{1,4}\))*)*[\w\s,()]{0,80}?\bAct,?\s+\d{4}\b",
            )
            .unwrap(),
        ),
        // "Schedule <roman numeral>"
        (
            PatternKind::Schedule,
            Regex::new(r"\bSchedule\s+[IVXLCDM]+\b").unwrap(),
        ),
        // "Chapter N" (roman or arabic)
        (
            PatternKind::Chapter,
            Regex::new(r"\bChapter\s+(?:[IVXLCDM]+\b|\d+[A-Z]?\b)").unwrap(),
        ),
        // "Clause N", with optional dotted sub-numbering
        (
            PatternKind::Clause,
            Regex::new(r"\bClauses?\s+\d+(?:\.\d+)*(?:\([0-9A-Za-z]{1,3}\))*").unwrap(),
        ),
        (PatternKind::Url, Regex::new(URL_PATTERN).unwrap()),
    ]
});

const URL_PATTERN: &str = r#"https?://[^\s<>"')\]]+"#;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(URL_PATTERN).unwrap());

/// Strip sentence punctuation that trails a URL token.
fn clean_url(url: &str) -> &str {
    url.trim_end_matches(['.', ',', ';', ':', '!', '?'])
}

/// First URL token in a sentence, if any. Shared by every non-URL
/// candidate detected in that sentence.
fn first_url(sentence: &str) -> Option<String> {
    URL_RE
        .find(sentence)
        .map(|m| clean_url(m.as_str()).to_string())
}

/// Split a regulation conjunction list into keyword-prefixed items.
///
/// `"Regulation 12(3) and 12(3A)"` → `["Regulation 12(3)", "Regulation 12(3A)"]`.
/// A single-item match is returned verbatim.
fn expand_regulation_list(matched: &str, items: &str) -> Vec<String> {
    static SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(?:,|\band\b|&)\s*").unwrap());

    let parts: Vec<&str> = SEP_RE.split(items).filter(|p| !p.is_empty()).collect();
    if parts.len() <= 1 {
        vec![matched.to_string()]
    } else {
        parts
            .into_iter()
            .map(|p| format!("Regulation {}", p))
            .collect()
    }
}

/// Scan every page for citation candidates.
///
/// Per page: segment into sentences, resolve each sentence's associated
/// URL, run every pattern independently, then add one url-kind candidate
/// per page-level hyperlink. The result is deduplicated by exact equality
/// of (page, kind, match, sentence); output order is not meaningful.
pub fn detect_candidates(pages: &[PageRecord]) -> Vec<Candidate> {
    let mut seen: HashSet<(u32, PatternKind, String, String)> = HashSet::new();
    let mut candidates = Vec::new();

    let mut push = |seen: &mut HashSet<_>, cand: Candidate| {
        let key = (
            cand.page,
            cand.kind,
            cand.matched.clone(),
            cand.sentence.clone(),
        );
        if seen.insert(key) {
            candidates.push(cand);
        }
    };

    for page in pages {
        for sentence in split_sentences(&page.text) {
            let sentence_url = first_url(&sentence);

            for (kind, re) in PATTERNS.iter() {
                match kind {
                    PatternKind::Url => {
                        // Every candidate in a sentence, url-kind included,
                        // carries the sentence's first URL as its `url`.
                        for m in re.find_iter(&sentence) {
                            push(
                                &mut seen,
                                Candidate {
                                    page: page.page,
                                    sentence: sentence.clone(),
                                    matched: clean_url(m.as_str()).to_string(),
                                    kind: PatternKind::Url,
                                    url: sentence_url.clone(),
                                },
                            );
                        }
                    }
                    PatternKind::Regulation => {
                        for caps in re.captures_iter(&sentence) {
                            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                            let items = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                            for matched in expand_regulation_list(whole, items) {
                                push(
                                    &mut seen,
                                    Candidate {
                                        page: page.page,
                                        sentence: sentence.clone(),
                                        matched,
                                        kind: PatternKind::Regulation,
                                        url: sentence_url.clone(),
                                    },
                                );
                            }
                        }
                    }
                    _ => {
                        for m in re.find_iter(&sentence) {
                            push(
                                &mut seen,
                                Candidate {
                                    page: page.page,
                                    sentence: sentence.clone(),
                                    matched: m.as_str().to_string(),
                                    kind: *kind,
                                    url: sentence_url.clone(),
                                },
                            );
                        }
                    }
                }
            }
        }

        // Page-level hyperlink annotations: empty sentence, URL is both
        // the match and the associated URL.
        for url in &page.urls {
            push(
                &mut seen,
                Candidate {
                    page: page.page,
                    sentence: String::new(),
                    matched: url.clone(),
                    kind: PatternKind::Url,
                    url: Some(url.clone()),
                },
            );
        }
    }

    tracing::debug!(
        pages = pages.len(),
        candidates = candidates.len(),
        "candidate detection complete"
    );
    candidates
}
