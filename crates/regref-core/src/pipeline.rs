use std::path::Path;

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};
use crate::detect::detect_candidates;
use crate::merge::merge_records;
use crate::normalize::{NormalizeError, Normalizer};
use crate::types::ReferenceRecord;

/// Default number of candidates handed to the normalizer per call.
pub const DEFAULT_BATCH_SIZE: usize = 40;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("page extraction failed: {0}")]
    Backend(#[from] BackendError),
    #[error("normalization failed (batch {batch}): {source}")]
    Normalize {
        batch: usize,
        #[source]
        source: NormalizeError,
    },
}

/// Run the hybrid pipeline on one document.
///
/// Stages: page extraction → candidate detection → batched normalization
/// → cross-page merge. Batches are normalized sequentially; the first
/// batch error aborts the run with no partial output. Zero candidates is
/// a valid terminal state and yields an empty list.
pub async fn run_hybrid(
    path: &Path,
    backend: &dyn PdfBackend,
    normalizer: &dyn Normalizer,
    batch_size: usize,
) -> Result<Vec<ReferenceRecord>, PipelineError> {
    let pages = backend.extract_pages(path)?;
    tracing::info!(pages = pages.len(), path = %path.display(), "extracted pages");

    let candidates = detect_candidates(&pages);
    if candidates.is_empty() {
        tracing::info!("no candidates detected; empty result");
        return Ok(Vec::new());
    }
    tracing::info!(
        candidates = candidates.len(),
        normalizer = normalizer.name(),
        "normalizing candidates"
    );

    let batch_size = batch_size.max(1);
    let mut records = Vec::new();
    for (i, batch) in candidates.chunks(batch_size).enumerate() {
        let normalized = normalizer
            .normalize(batch)
            .await
            .map_err(|source| PipelineError::Normalize { batch: i, source })?;
        tracing::debug!(batch = i, records = normalized.len(), "batch normalized");
        records.extend(normalized);
    }

    let merged = merge_records(records);
    tracing::info!(references = merged.len(), "pipeline complete");
    Ok(merged)
}
