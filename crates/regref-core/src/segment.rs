use once_cell::sync::Lazy;
use regex::Regex;

/// Split repaired page text into sentence-like units.
///
/// Conservative tuning for formal/legal prose: a boundary is a
/// sentence-terminating character (`.?!;`) followed by whitespace, and the
/// split happens only when the whitespace is followed by an uppercase
/// letter, an opening parenthesis, or a quotation mark. This avoids
/// splitting on abbreviations ("w.r.t. the") and mid-citation punctuation
/// ("Regulation 3(1)(b); provided that").
///
/// Never returns an empty sequence for non-empty input: when no boundary
/// qualifies, the whole trimmed text is the single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    // The regex crate has no lookahead, so match the terminator+gap and
    // peek at the following char manually.
    static BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?!;]\s+").unwrap());

    let mut sentences = Vec::new();
    let mut start = 0usize;
    for m in BOUNDARY_RE.find_iter(text) {
        let next = text[m.end()..].chars().next();
        if !next.is_some_and(starts_sentence) {
            continue;
        }
        // Keep the terminator with the sentence it closes.
        let chunk = text[start..m.start() + 1].trim();
        if !chunk.is_empty() {
            sentences.push(chunk.to_string());
        }
        start = m.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    if sentences.is_empty() && !text.trim().is_empty() {
        sentences.push(text.trim().to_string());
    }
    sentences
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c == '(' || c == '"' || c == '\'' || c == '\u{201C}' || c == '\u{2018}'
}
