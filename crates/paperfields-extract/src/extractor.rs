use paperfields_core::{
    AbstractExtractionResult, DocumentMetadata, LineRecord, LineSource, PaperRecord,
};

use crate::authors::{self, AuthorProvenance};
use crate::config::ExtractionConfig;
use crate::text::first_pages;
use crate::title::{self, TitleStrategy};
use crate::year::{self, YearStrategy};
use crate::{ExtractError, FieldCandidate, abstract_span};

/// A configurable per-document field extraction pipeline.
///
/// Holds an [`ExtractionConfig`] and exposes each resolver as a method.
/// The default constructor uses built-in defaults; use
/// [`FieldExtractor::with_config`] to supply custom rules and thresholds.
pub struct FieldExtractor {
    config: ExtractionConfig,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone)]
pub struct DocumentExtraction {
    pub record: PaperRecord,
    /// The abstract span with its markers, or the reason it was missed.
    pub abstract_result: AbstractExtractionResult,
}

impl FieldExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Resolve the title from the first pages, the filename stem and the metadata.
    pub fn resolve_title(
        &self,
        lines: &[LineRecord],
        stem: &str,
        metadata: &DocumentMetadata,
    ) -> Option<FieldCandidate<TitleStrategy>> {
        let sample = first_pages(lines, self.config.title_sample_pages, self.config.sample_max_lines);
        title::resolve_title(&sample, stem, metadata, &self.config)
    }

    pub fn resolve_year(
        &self,
        lines: &[LineRecord],
        stem: &str,
        metadata: &DocumentMetadata,
    ) -> Option<FieldCandidate<YearStrategy>> {
        let sample = first_pages(lines, self.config.year_scan_pages, self.config.sample_max_lines);
        year::resolve_year(&sample, stem, metadata)
    }

    /// Resolve the author. `title` should be the resolved title.
    pub fn resolve_author(
        &self,
        lines: &[LineRecord],
        title: Option<&str>,
        metadata: &DocumentMetadata,
    ) -> Option<FieldCandidate<AuthorProvenance>> {
        authors::resolve_author(lines, title, metadata, &self.config)
    }

    /// Resolve title, year and author in that order.
    pub fn resolve_title_year_author(
        &self,
        lines: &[LineRecord],
        stem: &str,
        metadata: &DocumentMetadata,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let title = self.resolve_title(lines, stem, metadata).map(|c| c.value);
        let year = self.resolve_year(lines, stem, metadata).map(|c| c.value);
        let author = self
            .resolve_author(lines, title.as_deref(), metadata)
            .map(|c| c.value);
        (title, year, author)
    }

    /// Locate and extract the abstract.
    pub fn extract_abstract(&self, lines: &[LineRecord]) -> AbstractExtractionResult {
        abstract_span::extract_abstract(lines, &self.config)
    }

    /// Run every resolver on a document, reading `source` once.
    pub fn extract_document(
        &self,
        source: &dyn LineSource,
        stem: &str,
    ) -> Result<DocumentExtraction, ExtractError> {
        let lines = source.lines()?;
        let metadata = source.metadata()?;

        let (title, year, author) = self.resolve_title_year_author(&lines, stem, &metadata);
        let abstract_result = self.extract_abstract(&lines);
        match abstract_result.reason() {
            Some(reason) => tracing::debug!(stem, %reason, "no abstract"),
            None => tracing::debug!(stem, span = ?abstract_result.span(), "abstract located"),
        }

        let record = process(
            title,
            year,
            author,
            abstract_result.abstract_text().map(str::to_string),
        );
        Ok(DocumentExtraction {
            record,
            abstract_result,
        })
    }
}

/// Package the four fields into a [`PaperRecord`], flattening the abstract to
/// a single paragraph.
pub fn process(
    title: Option<String>,
    year: Option<String>,
    author: Option<String>,
    abstract_text: Option<String>,
) -> PaperRecord {
    let abstract_text = abstract_text
        .map(|a| a.replace(['\r', '\n'], ""))
        .filter(|a| !a.trim().is_empty());
    PaperRecord {
        title,
        year,
        author,
        abstract_text,
    }
}
