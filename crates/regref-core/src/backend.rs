use std::path::Path;

use thiserror::Error;

use crate::types::PageRecord;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract page text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for paginated-document extraction backends.
///
/// Implementors produce one repaired [`PageRecord`] per physical page,
/// numbered from 1, in order. A document that cannot be opened or parsed
/// is a hard failure — no partial page list is ever returned, and the
/// underlying document resource must be released on every exit path.
pub trait PdfBackend: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageRecord>, BackendError>;
}
