use std::path::{Path, PathBuf};

use thiserror::Error;

use paperfields_core::config_file::{self, ConfigFile};
use paperfields_extract::{ExtractError, ExtractionConfigBuilder, FieldExtractor};

pub mod batch;
pub mod text_dump;

pub use batch::{BatchEntry, BatchReport, discover, is_text_dump_path, process_path, run_batch};
pub use text_dump::{TextDumpSource, parse_text_dump};
// Re-export domain types for convenience
pub use paperfields_core::{PaperRecord, SourceError};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("input not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to scan input directory: {0}")]
    Walk(String),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid rule pattern in config: {0}")]
    Pattern(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build an extractor from a config file.
///
/// With `path`, only that file is read. Without it, the user config and
/// `./.paperfields.toml` cascade is used, and missing files mean defaults.
pub fn load_extractor(path: Option<&Path>) -> Result<FieldExtractor, IngestError> {
    let file: ConfigFile = match path {
        Some(p) => toml::from_str(&std::fs::read_to_string(p)?)?,
        None => config_file::load_config(),
    };
    let config = ExtractionConfigBuilder::from_config_file(&file)
        .build()
        .map_err(|e| IngestError::Pattern(e.to_string()))?;
    tracing::debug!(
        max_abstract_pages = config.max_abstract_pages(),
        rules_version = paperfields_extract::RULES_VERSION,
        "extractor configured"
    );
    Ok(FieldExtractor::with_config(config))
}
