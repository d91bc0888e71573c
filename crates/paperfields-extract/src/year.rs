use once_cell::sync::Lazy;
use regex::Regex;

use paperfields_core::DocumentMetadata;

use crate::FieldCandidate;

/// Where a resolved year came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStrategy {
    Filename,
    Text,
    /// The metadata creation date, which records when the file was made
    /// rather than when the paper was published.
    CreationDate,
}

pub const YEAR_STRATEGIES: &[YearStrategy] = &[
    YearStrategy::Filename,
    YearStrategy::Text,
    YearStrategy::CreationDate,
];

impl YearStrategy {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Text => "text",
            Self::CreationDate => "metadata",
        }
    }
}

/// Filename year patterns, tried in order before the anywhere-in-stem fallback.
static FILENAME_YEAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:_|\()((?:19|20)\d{2})(?:\d{4})?\)?$",
        r"\[((?:19|20)\d{2})\]$",
        r"((?:19|20)\d{2})$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static YEAR_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

static CREATION_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:D:)?((?:19|20)\d{2})").unwrap());

/// First standalone 1900–2099 year in `s`.
pub fn year_in_text(s: &str) -> Option<String> {
    YEAR_WORD_RE.captures(s).map(|c| c[1].to_string())
}

/// Year from a filename stem: `_2022`, `_20220219`, `(2022)`, `[2022]`, a bare
/// trailing `2022`, then any standalone year.
pub fn year_from_filename(stem: &str) -> Option<String> {
    FILENAME_YEAR_PATTERNS
        .iter()
        .find_map(|re| re.captures(stem).map(|c| c[1].to_string()))
        .or_else(|| year_in_text(stem))
}

/// Year from a metadata creation date such as `D:20210314120000+08'00'`.
pub fn year_from_creation_date(date: &str) -> Option<String> {
    CREATION_DATE_RE.captures(date).map(|c| c[1].to_string())
}

/// Resolve the publication year. `lines` should be the first pages of the
/// document.
pub fn resolve_year(
    lines: &[&str],
    stem: &str,
    metadata: &DocumentMetadata,
) -> Option<FieldCandidate<YearStrategy>> {
    YEAR_STRATEGIES.iter().find_map(|strategy| {
        let value = match strategy {
            YearStrategy::Filename => year_from_filename(stem),
            YearStrategy::Text => lines.iter().find_map(|l| year_in_text(l)),
            YearStrategy::CreationDate => {
                metadata.creation_date().and_then(year_from_creation_date)
            }
        }?;
        tracing::debug!(strategy = strategy.tag(), year = %value, "year resolved");
        Some(FieldCandidate {
            value,
            provenance: *strategy,
        })
    })
}
