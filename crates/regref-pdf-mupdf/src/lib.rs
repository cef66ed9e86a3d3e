use std::path::Path;

use mupdf::{Document, TextPageFlags};

use regref_core::{BackendError, PageRecord, PdfBackend, repair_layout};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Pages are read strictly in order, numbered from 1. Per page, text is
/// gathered block by block in reading order, then layout damage is
/// repaired (de-hyphenation across line wraps, line breaks flattened,
/// whitespace collapsed). Hyperlink annotations with http(s) targets are
/// collected alongside the text. An unreadable document fails the whole
/// extraction; no partial page list is returned. The open `Document` is
/// dropped on every exit path, including errors mid-read.
#[derive(Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageRecord>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();

        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            // Keep raw line breaks until repair: de-hyphenation needs to
            // see the break between a trailing hyphen and its continuation.
            let mut raw = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    raw.push_str(&line_text);
                    raw.push('\n');
                }
            }

            let mut urls = Vec::new();
            for link in page
                .links()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?
            {
                let uri = link.uri;
                let is_web = uri.starts_with("http://") || uri.starts_with("https://");
                if is_web && !urls.contains(&uri) {
                    urls.push(uri);
                }
            }

            let record = PageRecord {
                page: (index + 1) as u32,
                text: repair_layout(&raw),
                urls,
            };
            tracing::trace!(
                page = record.page,
                chars = record.text.len(),
                links = record.urls.len(),
                "extracted page"
            );
            pages.push(record);
        }

        Ok(pages)
    }
}
