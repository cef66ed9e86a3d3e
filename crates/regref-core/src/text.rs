use once_cell::sync::Lazy;
use regex::Regex;

/// Repair layout damage in raw page text.
///
/// Steps, in order:
/// 1. Rejoin words split by hyphenation across a line break
///    (`"informa-\ntion"` → `"information"`)
/// 2. Flatten remaining line breaks to single spaces
/// 3. Collapse runs of whitespace to one space and trim
pub fn repair_layout(text: &str) -> String {
    let dehyphenated = dehyphenate(text);

    static BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());
    let flattened = BREAK_RE.replace_all(&dehyphenated, " ");

    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
    WS_RE.replace_all(&flattened, " ").trim().to_string()
}

/// Remove a hyphen immediately followed by a line break (optionally
/// surrounded by whitespace), joining the word to its continuation.
///
/// Non-hyphen breaks are left alone: `"a\nb"` stays two tokens.
fn dehyphenate(text: &str) -> String {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\w)-[ \t]*\r?\n\s*(\w)").unwrap());
    RE.replace_all(text, "${1}${2}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dehyphenation_across_line_break() {
        assert_eq!(repair_layout("informa-\ntion"), "information");
        assert_eq!(repair_layout("informa- \n tion"), "information");
    }

    #[test]
    fn test_non_hyphen_break_becomes_space() {
        assert_eq!(repair_layout("a\nb"), "a b");
    }

    #[test]
    fn test_inline_hyphen_preserved() {
        // A hyphen not followed by a break is part of the word
        assert_eq!(repair_layout("intra-day limits"), "intra-day limits");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(repair_layout("  two   words \n\n here  "), "two words here");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let clean = "Refer to Regulation 9(1) of the Regulations.";
        assert_eq!(repair_layout(clean), clean);
    }

    #[test]
    fn test_crlf_breaks() {
        assert_eq!(repair_layout("obliga-\r\ntions"), "obligations");
        assert_eq!(repair_layout("line one\r\nline two"), "line one line two");
    }
}
