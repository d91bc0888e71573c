use thiserror::Error;

use paperfields_core::LineSource;

pub mod abstract_span;
pub mod authors;
pub mod config;
pub mod extractor;
pub mod rules;
pub mod text;
pub mod title;
pub mod year;

pub use authors::{AuthorProvenance, AuthorStrategy, SearchWindow};
pub use config::{ExtractionConfig, ExtractionConfigBuilder, ListOverride};
pub use extractor::{DocumentExtraction, FieldExtractor, process};
pub use rules::{NamedRegex, RULES_VERSION};
pub use title::{TitleStrategy, normalize_title};
pub use year::YearStrategy;
// Re-export domain types from core (canonical definitions live there)
pub use paperfields_core::{
    AbstractExtractionResult, AbstractSpan, DocumentMetadata, LineRecord, MissReason, PaperRecord,
    SourceError,
};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("line source failed: {0}")]
    Source(#[from] SourceError),
}

/// A resolved field value with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate<P> {
    pub value: String,
    pub provenance: P,
}

/// Extract all four fields from a document with the default configuration.
pub fn extract_document(
    source: &dyn LineSource,
    stem: &str,
) -> Result<DocumentExtraction, ExtractError> {
    FieldExtractor::new().extract_document(source, stem)
}
