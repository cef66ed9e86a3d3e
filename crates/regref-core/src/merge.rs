use std::collections::HashMap;

use crate::types::{MergeKey, ReferenceRecord};

/// Collapse records denoting the same logical reference across pages.
///
/// Records share an identity when their merge key — (type, identifier
/// lower-cased, title lower-cased) — is equal. The first record seen under
/// a key wins its classification and key fields; later records contribute
/// evidence only:
/// - `pages` unioned, deduplicated, sorted ascending
/// - `snippets` unioned, deduplicated
/// - `confidence` raised to the maximum seen
/// - `url` and `anchor_page_hint` adopted when the stored record lacks them
///
/// First-seen-type-wins is deliberate; revisit only as an explicit design
/// change, not in passing.
pub fn merge_records(records: Vec<ReferenceRecord>) -> Vec<ReferenceRecord> {
    let total = records.len();
    let mut merged: Vec<ReferenceRecord> = Vec::new();
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    for record in records {
        let key = record.merge_key();
        match index.get(&key) {
            None => {
                let mut first = record;
                normalize_evidence(&mut first);
                index.insert(key, merged.len());
                merged.push(first);
            }
            Some(&i) => {
                let stored = &mut merged[i];
                stored.pages.extend(record.pages);
                normalize_pages(&mut stored.pages);
                for snippet in record.snippets {
                    if !stored.snippets.contains(&snippet) {
                        stored.snippets.push(snippet);
                    }
                }
                if record.confidence > stored.confidence {
                    stored.confidence = record.confidence;
                }
                if stored.url.is_none() {
                    stored.url = record.url;
                }
                if stored.anchor_page_hint.is_none() {
                    stored.anchor_page_hint = record.anchor_page_hint;
                }
            }
        }
    }

    tracing::debug!(input = total, output = merged.len(), "merge complete");
    merged
}

fn normalize_pages(pages: &mut Vec<u32>) {
    pages.sort_unstable();
    pages.dedup();
}

fn normalize_evidence(record: &mut ReferenceRecord) {
    normalize_pages(&mut record.pages);
    let mut unique = Vec::with_capacity(record.snippets.len());
    for snippet in record.snippets.drain(..) {
        if !unique.contains(&snippet) {
            unique.push(snippet);
        }
    }
    record.snippets = unique;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefType;

    fn record(
        ref_type: RefType,
        identifier: &str,
        pages: Vec<u32>,
        snippet: &str,
        confidence: f64,
    ) -> ReferenceRecord {
        ReferenceRecord {
            ref_type,
            title: None,
            identifier: Some(identifier.to_string()),
            url: None,
            anchor_page_hint: None,
            pages,
            snippets: vec![snippet.to_string()],
            confidence,
        }
    }

    #[test]
    fn test_union_pages_and_snippets() {
        let a = record(RefType::Circular, "SEBI/HO/CIR/2023/45", vec![3, 1], "first", 0.4);
        let b = record(RefType::Circular, "SEBI/HO/CIR/2023/45", vec![2, 1], "second", 0.9);
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pages, vec![1, 2, 3]);
        assert_eq!(merged[0].snippets, vec!["first", "second"]);
        assert_eq!(merged[0].confidence, 0.9);
    }

    #[test]
    fn test_merge_order_invariant() {
        let a = record(RefType::Regulation, "Regulation 9(1)", vec![2], "a", 0.4);
        let b = record(RefType::Regulation, "Regulation 9(1)", vec![5], "b", 0.7);
        let c = record(RefType::Regulation, "Regulation 9(1)", vec![1], "c", 0.6);

        let ab_then_c = merge_records(vec![a.clone(), b.clone(), c.clone()]);
        let bc_then_a = merge_records(vec![b, c, a]);

        assert_eq!(ab_then_c.len(), 1);
        assert_eq!(bc_then_a.len(), 1);
        assert_eq!(ab_then_c[0].pages, bc_then_a[0].pages);
        let mut left = ab_then_c[0].snippets.clone();
        let mut right = bc_then_a[0].snippets.clone();
        left.sort();
        right.sort();
        assert_eq!(left, right);
        assert_eq!(ab_then_c[0].confidence, 0.7);
        assert_eq!(bc_then_a[0].confidence, 0.7);
    }

    #[test]
    fn test_first_seen_type_wins() {
        // Same (identifier, title) but different type: different merge keys,
        // so the records stay separate.
        let a = record(RefType::Circular, "XYZ/CIR/2020/1", vec![1], "a", 0.4);
        let b = record(RefType::Other, "XYZ/CIR/2020/1", vec![2], "b", 0.9);
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged.len(), 2);
        // And for records that do share a key, the stored type never changes.
        let c = record(RefType::Circular, "ABC/CIR/2021/2", vec![1], "c", 0.4);
        let d = record(RefType::Circular, "abc/cir/2021/2", vec![2], "d", 0.9);
        let merged = merge_records(vec![c, d]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].ref_type, RefType::Circular);
        assert_eq!(merged[0].identifier.as_deref(), Some("ABC/CIR/2021/2"));
    }

    #[test]
    fn test_adopt_missing_url_and_anchor() {
        let a = record(RefType::Url, "", vec![1], "a", 0.4);
        let mut b = record(RefType::Url, "", vec![2], "b", 0.4);
        b.url = Some("https://example.gov/doc#page=7".to_string());
        b.anchor_page_hint = Some(7);
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url.as_deref(), Some("https://example.gov/doc#page=7"));
        assert_eq!(merged[0].anchor_page_hint, Some(7));
    }

    #[test]
    fn test_existing_url_not_overwritten() {
        let mut a = record(RefType::Url, "", vec![1], "a", 0.4);
        a.url = Some("https://first.example".to_string());
        let mut b = record(RefType::Url, "", vec![2], "b", 0.4);
        b.url = Some("https://second.example".to_string());
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged[0].url.as_deref(), Some("https://first.example"));
    }

    #[test]
    fn test_single_record_evidence_normalized() {
        let mut a = record(RefType::Clause, "Clause 5", vec![3, 1, 3], "dup", 0.4);
        a.snippets = vec!["dup".into(), "dup".into()];
        let merged = merge_records(vec![a]);
        assert_eq!(merged[0].pages, vec![1, 3]);
        assert_eq!(merged[0].snippets, vec!["dup"]);
    }
}
