use std::future::Future;
use std::pin::Pin;

use regref_core::{
    Candidate, NormalizeError, Normalizer, ReferenceRecord, anchor_page_hint, truncate_payload,
    validate_records,
};

use crate::client::{ChatClient, strip_code_fence};

const SYSTEM_PROMPT: &str = "You normalize raw citation candidates found in a regulatory PDF \
into structured reference records. Return ONLY a JSON array of objects with fields: type \
(one of \"Circular\", \"Master Circular\", \"Regulation\", \"Act Section\", \"Schedule\", \
\"Chapter\", \"Clause\", \"Stock Exchange Circular\", \"Depository Circular\", \"URL\", \
\"Other\"), title (string or null, verbatim from the evidence, never invented), identifier \
(string or null), url (string or null), anchorPageHint (integer or null), pages (non-empty \
array of integers), snippets (non-empty array of strings, each an exact quote of at most 200 \
characters), confidence (number in [0,1], lower when ambiguous). Never fabricate a title, \
identifier, or url that is absent from the input evidence.";

/// LLM-backed implementation of [`Normalizer`].
///
/// Sends each candidate batch as JSON, parses the returned array into
/// records, derives missing `anchorPageHint`s from documented `#page=N`
/// URL fragments, and validates fail-closed. Any schema violation aborts
/// the batch with the raw payload (truncated) in the error.
pub struct LlmNormalizer {
    client: ChatClient,
}

impl LlmNormalizer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub(crate) fn parse_records(content: &str) -> Result<Vec<ReferenceRecord>, NormalizeError> {
        let payload = strip_code_fence(content);
        let records: Vec<ReferenceRecord> =
            serde_json::from_str(payload).map_err(|e| NormalizeError::Schema {
                reason: e.to_string(),
                payload: truncate_payload(payload),
            })?;
        if records.is_empty() {
            return Err(NormalizeError::Empty);
        }
        Ok(records)
    }

    /// Fill in `anchor_page_hint` from the record's URL fragment when the
    /// model omitted it. Only the documented `#page=N` form is parsed.
    fn derive_anchor_hints(records: &mut [ReferenceRecord]) {
        for record in records {
            if record.anchor_page_hint.is_none() {
                record.anchor_page_hint = record.url.as_deref().and_then(anchor_page_hint);
            }
        }
    }
}

impl Normalizer for LlmNormalizer {
    fn name(&self) -> &str {
        "llm"
    }

    fn normalize<'a>(
        &'a self,
        batch: &'a [Candidate],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReferenceRecord>, NormalizeError>> + Send + 'a>>
    {
        Box::pin(async move {
            let user = serde_json::json!(format!(
                "Candidates:\n{}",
                serde_json::to_string_pretty(batch).unwrap_or_default()
            ));
            let content = self
                .client
                .complete(SYSTEM_PROMPT, user)
                .await
                .map_err(|e| NormalizeError::Request(e.to_string()))?;

            let mut records = Self::parse_records(&content)?;
            Self::derive_anchor_hints(&mut records);
            validate_records(&records, strip_code_fence(&content))?;
            Ok(records)
        })
    }
}
