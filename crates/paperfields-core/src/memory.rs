//! In-memory line source for tests and for callers that already hold text.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::source::{LineSource, SourceError};
use crate::{DocumentMetadata, LineRecord, lines_from_pairs};

/// A [`LineSource`] backed by lines and metadata held in memory.
///
/// Supports:
/// - A fixed set of lines and metadata returned on every call.
/// - A simulated open failure via [`failing`](MemorySource::failing).
/// - Read counting via [`read_count()`](MemorySource::read_count).
#[derive(Debug, Default)]
pub struct MemorySource {
    lines: Vec<LineRecord>,
    metadata: DocumentMetadata,
    failure: Option<String>,
    read_count: AtomicUsize,
}

impl MemorySource {
    pub fn new(lines: Vec<LineRecord>) -> Self {
        Self {
            lines,
            ..Default::default()
        }
    }

    /// Create a source from `(page, text)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        Self::new(lines_from_pairs(pairs))
    }

    /// Create a source whose every read fails with an open error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of times [`lines`](LineSource::lines) has been called.
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SourceError> {
        match &self.failure {
            Some(msg) => Err(SourceError::OpenError(msg.clone())),
            None => Ok(()),
        }
    }
}

impl LineSource for MemorySource {
    fn lines(&self) -> Result<Vec<LineRecord>, SourceError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.lines.clone())
    }

    fn metadata(&self) -> Result<DocumentMetadata, SourceError> {
        self.check()?;
        Ok(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_returns_fresh_copies() {
        let source = MemorySource::from_pairs([(0, "Title"), (1, "Body  ")]);
        let first = source.lines().unwrap();
        let second = source.lines().unwrap();
        assert_eq!(first, second);
        assert_eq!(first[1].text, "Body");
        assert_eq!(source.read_count(), 2);
    }

    #[test]
    fn test_failing_source() {
        let source = MemorySource::failing("locked");
        assert!(matches!(source.lines(), Err(SourceError::OpenError(m)) if m == "locked"));
        assert!(source.metadata().is_err());
    }
}
