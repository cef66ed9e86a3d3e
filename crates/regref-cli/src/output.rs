use regref_core::ReferenceRecord;

/// Serialize records as a JSON array; absent optional fields are null.
pub fn records_to_json(records: &[ReferenceRecord]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Flatten records into CSV, one row per record.
///
/// `pages` are pipe-joined, `first_page` is the minimum page, snippets are
/// `" | "`-joined. Values containing a comma, quote, or newline are quoted
/// with internal quotes doubled.
pub fn records_to_csv(records: &[ReferenceRecord]) -> String {
    let mut out = String::from(
        "type,title,identifier,url,anchorPageHint,pages,first_page,snippets,confidence\n",
    );
    for r in records {
        let pages = r
            .pages
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("|");
        // pages is sorted ascending, so the minimum comes first
        let first_page = r
            .pages
            .first()
            .map(|p| p.to_string())
            .unwrap_or_default();
        let anchor = r
            .anchor_page_hint
            .map(|p| p.to_string())
            .unwrap_or_default();
        let snippets = r.snippets.join(" | ");
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            csv_escape(r.ref_type.as_str()),
            csv_escape(r.title.as_deref().unwrap_or("")),
            csv_escape(r.identifier.as_deref().unwrap_or("")),
            csv_escape(r.url.as_deref().unwrap_or("")),
            anchor,
            pages,
            first_page,
            csv_escape(&snippets),
            r.confidence,
        ));
    }
    out
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
