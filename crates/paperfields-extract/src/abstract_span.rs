//! Abstract span extraction.
//!
//! A linear scan with two states. While seeking, every line is tried against
//! the start rules; the first hit opens the span on that line's page. While
//! collecting, each line is checked for the page limit, then the hard end
//! rules, then the soft header end, and is otherwise appended to the buffer.

use once_cell::sync::Lazy;
use regex::Regex;

use paperfields_core::{AbstractExtractionResult, AbstractSpan, LineRecord, MissReason};

use crate::config::ExtractionConfig;
use crate::rules::{PAGE_NUMBER_RE, START_REGEXES};
use crate::text::{join_with_hyphen_fix, looks_like_section_header};

/// Marker for a span that stopped at a heading-like line.
pub const SOFT_HEADER_MARKER: &str = "soft_header";
/// Marker for a span that ran to the end of the input.
pub const EOF_MARKER: &str = "eof_or_limit";

/// Marker for a span cut at the page limit, e.g. `page_limit_3`.
pub fn page_limit_marker(max_pages: usize) -> String {
    format!("page_limit_{max_pages}")
}

enum ScanState {
    SeekingStart,
    Collecting(OpenSpan),
}

struct OpenSpan {
    start_page: usize,
    start_marker: String,
    buffer: Vec<String>,
    /// Page of the last line appended to `buffer`.
    last_page: Option<usize>,
}

impl OpenSpan {
    fn open(line: &LineRecord) -> Option<Self> {
        START_REGEXES.iter().find_map(|rule| {
            let caps = rule.regex.captures(&line.text)?;
            tracing::trace!(rule = %rule.name, page = line.page, "abstract start matched");
            let buffer = caps
                .name("inline")
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(|s| vec![s.to_string()])
                .unwrap_or_default();
            Some(Self {
                start_page: line.page,
                start_marker: rule.name.clone(),
                buffer,
                last_page: None,
            })
        })
    }
}

/// Locate and extract the abstract of a document.
pub fn extract_abstract(lines: &[LineRecord], config: &ExtractionConfig) -> AbstractExtractionResult {
    let Some(last_line) = lines.last() else {
        return AbstractExtractionResult::missed(MissReason::NoText, AbstractSpan::default());
    };

    let end_rules = config.end_rules();
    let max_pages = config.max_abstract_pages();

    let mut state = ScanState::SeekingStart;
    let mut end: Option<(String, usize)> = None;

    for line in lines {
        match &mut state {
            ScanState::SeekingStart => {
                if let Some(span) = OpenSpan::open(line) {
                    state = ScanState::Collecting(span);
                }
            }
            ScanState::Collecting(span) => {
                let max_end_page = span.start_page + max_pages - 1;
                if line.page > max_end_page {
                    end = Some((
                        page_limit_marker(max_pages),
                        span.last_page.unwrap_or(span.start_page),
                    ));
                    break;
                }
                if let Some(rule) = end_rules.iter().find(|r| r.regex.is_match(&line.text)) {
                    end = Some((rule.name.clone(), line.page));
                    break;
                }
                if span.buffer.len() >= config.soft_end_min_lines
                    && looks_like_section_header(&line.text)
                {
                    end = Some((SOFT_HEADER_MARKER.to_string(), line.page));
                    break;
                }
                span.buffer.push(line.text.clone());
                span.last_page = Some(line.page);
            }
        }
    }

    let ScanState::Collecting(span) = state else {
        tracing::debug!(lines = lines.len(), "abstract start not found");
        return AbstractExtractionResult::missed(MissReason::StartNotFound, AbstractSpan::default());
    };

    let (end_marker, end_page) = end.unwrap_or_else(|| {
        let max_end_page = span.start_page + max_pages - 1;
        (EOF_MARKER.to_string(), max_end_page.min(last_line.page))
    });

    let result_span = AbstractSpan {
        start_page: Some(span.start_page),
        end_page: Some(end_page),
        start_marker: Some(span.start_marker),
        end_marker: Some(end_marker),
    };

    let text = clean_abstract(span.buffer);
    tracing::debug!(
        start_page = span.start_page,
        end_page,
        start_marker = result_span.start_marker.as_deref(),
        end_marker = result_span.end_marker.as_deref(),
        chars = text.chars().count(),
        "abstract span"
    );

    if text.is_empty() {
        return AbstractExtractionResult::missed(MissReason::EmptyAfterExtraction, result_span);
    }
    AbstractExtractionResult::extracted(text, result_span)
}

/// Trim blank edges and trailing page numbers, repair hyphenation, and cap
/// blank-line runs at one.
fn clean_abstract(mut buffer: Vec<String>) -> String {
    static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

    let leading = buffer.iter().take_while(|l| l.trim().is_empty()).count();
    buffer.drain(..leading);
    while buffer.last().is_some_and(|l| l.trim().is_empty()) {
        buffer.pop();
    }
    while buffer.last().is_some_and(|l| PAGE_NUMBER_RE.is_match(l.trim())) {
        buffer.pop();
    }

    let text = join_with_hyphen_fix(&buffer);
    BLANK_RUN_RE.replace_all(text.trim(), "\n\n").into_owned()
}
