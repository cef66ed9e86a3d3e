use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use regref_core::{ReferenceRecord, merge_records, validate_records};

use crate::LlmError;
use crate::client::{ChatClient, strip_code_fence};
use crate::normalizer::LlmNormalizer;

const ONESHOT_SYSTEM: &str = "You extract structured cross-reference citations from \
regulatory documents and answer only with JSON.";

const ONESHOT_PROMPT: &str = "Extract every cross-reference citation from the attached \
regulatory PDF: circulars, master circulars, regulations, act sections, schedules, chapters, \
clauses, stock exchange and depository circulars, and URLs. Return ONLY a JSON array of \
reference records with fields type, title, identifier, url, anchorPageHint, pages, snippets, \
confidence. Quote snippets exactly (at most 200 characters each) and list every page a \
reference appears on. Never fabricate a title, identifier, or url not present in the document.";

/// One-shot strategy: hand the raw document bytes to the model and let it
/// produce the entire reference list in a single call.
///
/// The response goes through the same fail-closed schema validation as the
/// hybrid path, then through the merge step so duplicate records the model
/// emits for different pages collapse with unioned evidence.
pub async fn extract_oneshot(
    path: &Path,
    client: &ChatClient,
) -> Result<Vec<ReferenceRecord>, LlmError> {
    let bytes = std::fs::read(path)?;
    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        model = client.model(),
        "one-shot extraction"
    );

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf");
    let user_content = serde_json::json!([
        {
            "type": "file",
            "file": {
                "filename": filename,
                "file_data": format!("data:application/pdf;base64,{}", BASE64.encode(&bytes)),
            },
        },
        { "type": "text", "text": ONESHOT_PROMPT },
    ]);

    let content = client.complete(ONESHOT_SYSTEM, user_content).await?;
    let records = LlmNormalizer::parse_records(&content)?;
    validate_records(&records, strip_code_fence(&content))?;
    Ok(merge_records(records))
}
