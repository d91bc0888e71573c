use thiserror::Error;

use crate::{DocumentMetadata, LineRecord};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to read document text: {0}")]
    ReadError(String),
    #[error("failed to read document metadata: {0}")]
    MetadataError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability interface for the document-text collaborator.
///
/// Implementors turn one document into an ordered `(page, line)` stream and a
/// metadata mapping; the heuristic resolvers in `paperfields-extract` never
/// touch the underlying file format. Each call produces a fresh sequence, so a
/// source can be re-read by calling [`lines`](LineSource::lines) again.
pub trait LineSource: Send + Sync {
    /// Produce every line of the document in page-major, top-to-bottom order.
    fn lines(&self) -> Result<Vec<LineRecord>, SourceError>;

    /// Produce the document metadata (possibly empty).
    fn metadata(&self) -> Result<DocumentMetadata, SourceError>;
}
