pub mod backend;
pub mod detect;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod text;
pub mod types;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use detect::detect_candidates;
pub use merge::merge_records;
pub use normalize::{
    NormalizeError, Normalizer, RulesNormalizer, anchor_page_hint, kind_to_type,
    truncate_payload, validate_records,
};
pub use pipeline::{DEFAULT_BATCH_SIZE, PipelineError, run_hybrid};
pub use segment::split_sentences;
pub use text::repair_layout;
pub use types::{
    Candidate, MAX_SNIPPET_CHARS, MergeKey, PageRecord, PatternKind, RefType, ReferenceRecord,
    clip_snippet,
};
