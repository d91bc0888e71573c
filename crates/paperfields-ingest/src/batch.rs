use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use paperfields_core::{LineSource, PaperRecord};
use paperfields_extract::FieldExtractor;

use crate::IngestError;
use crate::text_dump::{META_SIDECAR_SUFFIX, TextDumpSource};

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub record: Option<PaperRecord>,
    /// Why the abstract was not found, when the document itself was readable.
    pub abstract_miss: Option<String>,
    pub error: Option<String>,
}

/// Per-document outcomes, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Documents that produced a record.
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.record.is_some()).count()
    }

    /// Documents skipped because of an error.
    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    /// Documents with an extracted abstract.
    pub fn abstracts_found(&self) -> usize {
        self.records().filter(|r| r.abstract_text.is_some()).count()
    }

    pub fn records(&self) -> impl Iterator<Item = &PaperRecord> {
        self.entries.iter().filter_map(|e| e.record.as_ref())
    }
}

/// Whether `path` names a text dump (and not a metadata sidecar).
pub fn is_text_dump_path(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".txt") && !name.ends_with(META_SIDECAR_SUFFIX)
}

/// Text dumps under `input`, sorted by path. A file is returned as is; a
/// directory is scanned one level deep, or fully when `recursive` is set.
pub fn discover(input: &Path, recursive: bool) -> Result<Vec<PathBuf>, IngestError> {
    if input.is_file() {
        if is_text_dump_path(input) {
            return Ok(vec![input.to_path_buf()]);
        }
        tracing::warn!(path = %input.display(), "skipping non-text input");
        return Ok(Vec::new());
    }
    if !input.is_dir() {
        return Err(IngestError::NotFound(input.to_path_buf()));
    }

    let mut walker = WalkDir::new(input);
    if !recursive {
        walker = walker.max_depth(1);
    }
    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| IngestError::Walk(e.to_string()))?;
        if entry.file_type().is_file() && is_text_dump_path(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Process documents one at a time, in order.
///
/// `open` turns each item into a line source. A document that cannot be opened
/// or read is logged, recorded in the report and skipped.
pub fn run_batch<S, F>(extractor: &FieldExtractor, items: &[PathBuf], open: F) -> BatchReport
where
    S: LineSource,
    F: Fn(&Path) -> Result<S, IngestError>,
{
    let mut report = BatchReport::default();
    for (i, path) in items.iter().enumerate() {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = open(path).and_then(|source| {
            extractor
                .extract_document(&source, &stem)
                .map_err(IngestError::from)
        });
        // the source is dropped here on both paths

        let entry = match outcome {
            Ok(doc) => {
                tracing::debug!(
                    index = i,
                    path = %path.display(),
                    has_abstract = doc.record.abstract_text.is_some(),
                    "document processed"
                );
                BatchEntry {
                    path: path.clone(),
                    abstract_miss: doc.abstract_result.reason().map(|r| r.to_string()),
                    record: Some(doc.record),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(index = i, path = %path.display(), error = %e, "skipping document");
                BatchEntry {
                    path: path.clone(),
                    record: None,
                    abstract_miss: None,
                    error: Some(e.to_string()),
                }
            }
        };
        report.entries.push(entry);
    }
    tracing::info!(
        total = report.entries.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        abstracts = report.abstracts_found(),
        "batch finished"
    );
    report
}

/// Discover text dumps under `input` and process them with [`TextDumpSource`].
pub fn process_path(
    extractor: &FieldExtractor,
    input: &Path,
    recursive: bool,
) -> Result<BatchReport, IngestError> {
    let paths = discover(input, recursive)?;
    Ok(run_batch(extractor, &paths, |p| Ok(TextDumpSource::new(p))))
}
