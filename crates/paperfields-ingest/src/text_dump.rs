use std::fs;
use std::path::{Path, PathBuf};

use paperfields_core::{DocumentMetadata, LineRecord, LineSource, SourceError};
use paperfields_extract::text::expand_ligatures;

/// Page separator in text dumps (`pdftotext` and similar tools emit it).
pub const PAGE_SEPARATOR: char = '\x0c';

/// Extension of the optional metadata sidecar next to a text dump.
pub const META_SIDECAR_SUFFIX: &str = ".meta.toml";

/// A [`LineSource`] over a UTF-8 text dump of a paper.
///
/// Pages are separated by form feeds. Metadata comes from an optional sibling
/// `<stem>.meta.toml` holding string keys and string values, e.g.
///
/// ```toml
/// title = "A Study of Things"
/// author = "Jane Doe"
/// creationDate = "D:20210314120000"
/// ```
#[derive(Debug, Clone)]
pub struct TextDumpSource {
    path: PathBuf,
}

impl TextDumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename stem, used as the filename hint for title and year.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path of the metadata sidecar (which may not exist).
    pub fn sidecar_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!("{}{}", self.stem(), META_SIDECAR_SUFFIX))
    }
}

impl LineSource for TextDumpSource {
    fn lines(&self) -> Result<Vec<LineRecord>, SourceError> {
        let bytes = fs::read(&self.path)
            .map_err(|e| SourceError::OpenError(format!("{}: {}", self.path.display(), e)))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| SourceError::ReadError(format!("{}: {}", self.path.display(), e)))?;
        let lines = parse_text_dump(&text);
        tracing::trace!(path = %self.path.display(), lines = lines.len(), "read text dump");
        Ok(lines)
    }

    fn metadata(&self) -> Result<DocumentMetadata, SourceError> {
        let sidecar = self.sidecar_path();
        if !sidecar.is_file() {
            return Ok(DocumentMetadata::new());
        }
        let content = fs::read_to_string(&sidecar)?;
        toml::from_str(&content)
            .map_err(|e| SourceError::MetadataError(format!("{}: {}", sidecar.display(), e)))
    }
}

/// Split a text dump into page-tagged lines.
///
/// Line endings are normalized to `\n`, ligatures are expanded and trailing
/// whitespace is stripped. An empty segment after the final form feed is not
/// a page.
pub fn parse_text_dump(text: &str) -> Vec<LineRecord> {
    let text = expand_ligatures(&text.replace("\r\n", "\n").replace('\r', "\n"));
    let mut pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }

    pages
        .into_iter()
        .enumerate()
        .flat_map(|(page, content)| content.lines().map(move |l| LineRecord::new(page, l)))
        .collect()
}
