use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config_file;
pub mod memory;
pub mod source;

pub use config_file::ConfigFile;
pub use memory::MemorySource;
pub use source::{LineSource, SourceError};

/// Metadata key for the document title.
pub const META_TITLE: &str = "title";
/// Metadata key for the document author.
pub const META_AUTHOR: &str = "author";
/// Metadata key for the creation date (`D:YYYYMMDDHHmmss...` in most PDFs).
pub const META_CREATION_DATE: &str = "creationDate";

/// Metadata values that authoring tools leave behind instead of real data.
const META_PLACEHOLDERS: &[&str] = &["unknown", "untitled", "title", "author", "null", "none"];

/// One line of extracted document text.
///
/// Trailing whitespace is stripped on construction; leading whitespace is kept
/// because indentation is sometimes the only hint that a line is a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// 0-based page index.
    pub page: usize,
    pub text: String,
}

impl LineRecord {
    pub fn new(page: usize, text: impl Into<String>) -> Self {
        let mut text = text.into();
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        Self { page, text }
    }
}

/// Build a line list from `(page, text)` pairs. Mostly a test convenience.
pub fn lines_from_pairs<'a, I>(pairs: I) -> Vec<LineRecord>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(page, text)| LineRecord::new(page, text))
        .collect()
}

/// Free-form document metadata as reported by the text-extraction collaborator.
///
/// Treated as the weakest evidence for every field: PDF producers frequently
/// fill it with template or placeholder values. Use the sanitized accessors
/// ([`title`](Self::title), [`author`](Self::author),
/// [`creation_date`](Self::creation_date)) rather than raw [`get`](Self::get).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(BTreeMap<String, String>);

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value for `key`, unsanitized.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trimmed value for `key`, or `None` when it is empty or a known placeholder.
    pub fn sanitized(&self, key: &str) -> Option<&str> {
        let value = self.get(key)?.trim();
        if value.is_empty() {
            return None;
        }
        let lower = value.to_lowercase();
        if META_PLACEHOLDERS.contains(&lower.as_str()) {
            return None;
        }
        Some(value)
    }

    pub fn title(&self) -> Option<&str> {
        self.sanitized(META_TITLE)
    }

    pub fn author(&self) -> Option<&str> {
        self.sanitized(META_AUTHOR)
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.sanitized(META_CREATION_DATE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DocumentMetadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Why the abstract extractor gave up on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    NoText,
    StartNotFound,
    EmptyAfterExtraction,
}

impl MissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoText => "No text extracted",
            Self::StartNotFound => "Start marker not found",
            Self::EmptyAfterExtraction => "Empty text after extraction",
        }
    }
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an abstract span starts and ends, and which rules decided it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractSpan {
    pub start_page: Option<usize>,
    pub end_page: Option<usize>,
    pub start_marker: Option<String>,
    pub end_marker: Option<String>,
}

/// Outcome of abstract extraction for one document.
///
/// Exactly one of [`abstract_text`](Self::abstract_text) and
/// [`reason`](Self::reason) is present; the two constructors are the only way
/// to build a value, so the invariant holds for every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbstractExtractionResult {
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(flatten)]
    span: AbstractSpan,
    reason: Option<MissReason>,
}

impl AbstractExtractionResult {
    pub fn extracted(text: String, span: AbstractSpan) -> Self {
        Self {
            abstract_text: Some(text),
            span,
            reason: None,
        }
    }

    pub fn missed(reason: MissReason, span: AbstractSpan) -> Self {
        Self {
            abstract_text: None,
            span,
            reason: Some(reason),
        }
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn reason(&self) -> Option<MissReason> {
        self.reason
    }

    pub fn span(&self) -> &AbstractSpan {
        &self.span
    }

    pub fn start_page(&self) -> Option<usize> {
        self.span.start_page
    }

    pub fn end_page(&self) -> Option<usize> {
        self.span.end_page
    }

    pub fn start_marker(&self) -> Option<&str> {
        self.span.start_marker.as_deref()
    }

    pub fn end_marker(&self) -> Option<&str> {
        self.span.end_marker.as_deref()
    }
}

/// The four-field record handed to surrounding systems (web handlers, CSV
/// writers, keyword generators).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: Option<String>,
    pub year: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}
