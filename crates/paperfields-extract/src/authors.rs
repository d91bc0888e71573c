use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use paperfields_core::{DocumentMetadata, LineRecord};

use crate::FieldCandidate;
use crate::config::ExtractionConfig;
use crate::rules::{
    ACADEMIC_CONTEXT_TERMS, ADVISOR_CONTEXT_RE, ADVISOR_STOPWORDS, AUTHOR_HEADER_REGEX,
    AUTHOR_LABEL_REGEXES, NAME_SHAPE_RE, NAME_STOPWORDS,
};
use crate::text::{CJK_CLASS, char_len, collapse_whitespace, first_pages, has_cjk};

/// In-text author strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStrategy {
    /// An explicit `作者：` / `Author:` style label.
    Label,
    /// A bare name line near advisor vocabulary on a thesis cover.
    AdvisorProximity,
    /// Any bare 2–4 character Chinese name line, preferring academic context.
    NameShape,
}

impl AuthorStrategy {
    /// Label and advisor matches both count as labeled evidence.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Label | Self::AdvisorProximity => "label",
            Self::NameShape => "guess",
        }
    }

    fn attempt(&self, lines: &[&str], title: Option<&str>, config: &ExtractionConfig) -> Option<String> {
        match self {
            Self::Label => label_match(lines, config),
            Self::AdvisorProximity => advisor_proximity(lines, config),
            Self::NameShape => name_shape_guess(lines, title, config),
        }
    }
}

/// How much of the document an author strategy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    Narrow,
    Wide,
}

/// The in-text cascade: each step runs its strategies in order over its
/// window, and the first value found ends the cascade.
pub const AUTHOR_CASCADE: &[(SearchWindow, &[AuthorStrategy])] = &[
    (
        SearchWindow::Narrow,
        &[AuthorStrategy::Label, AuthorStrategy::AdvisorProximity],
    ),
    (SearchWindow::Narrow, &[AuthorStrategy::NameShape]),
    (
        SearchWindow::Wide,
        &[AuthorStrategy::Label, AuthorStrategy::AdvisorProximity],
    ),
    (SearchWindow::Wide, &[AuthorStrategy::NameShape]),
];

/// Where a resolved author came from, rendered as `label-3p`, `guess-8p`,
/// `label-3p+cjk`, `metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorProvenance {
    Text {
        strategy: AuthorStrategy,
        window: SearchWindow,
        /// Page count of the window.
        pages: usize,
        /// An ASCII author was replaced by a CJK name guess.
        cjk_override: bool,
    },
    Metadata,
}

impl fmt::Display for AuthorProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text {
                strategy,
                pages,
                cjk_override,
                ..
            } => {
                write!(f, "{}-{}p", strategy.tag(), pages)?;
                if *cjk_override {
                    f.write_str("+cjk")?;
                }
                Ok(())
            }
            Self::Metadata => f.write_str("metadata"),
        }
    }
}

/// Resolve the author of a document.
///
/// `title` is the already resolved title; name guesses that are fragments of
/// it are ignored, and a CJK title triggers the CJK override.
pub fn resolve_author(
    lines: &[LineRecord],
    title: Option<&str>,
    metadata: &DocumentMetadata,
    config: &ExtractionConfig,
) -> Option<FieldCandidate<AuthorProvenance>> {
    let narrow = first_pages(lines, config.author_narrow_pages, config.sample_max_lines);
    let wide = first_pages(lines, config.author_wide_pages, config.author_wide_max_lines);
    let window_lines = |window: SearchWindow| match window {
        SearchWindow::Narrow => (narrow.as_slice(), config.author_narrow_pages),
        SearchWindow::Wide => (wide.as_slice(), config.author_wide_pages),
    };

    let mut found = AUTHOR_CASCADE.iter().find_map(|(window, strategies)| {
        let (scan, pages) = window_lines(*window);
        strategies.iter().find_map(|strategy| {
            let value = strategy.attempt(scan, title, config)?;
            Some(FieldCandidate {
                value,
                provenance: AuthorProvenance::Text {
                    strategy: *strategy,
                    window: *window,
                    pages,
                    cjk_override: false,
                },
            })
        })
    });

    // Prefer a Chinese name for a Chinese paper. This runs the name-shape
    // guess without checking for a labeled CJK author first, so a correct
    // ASCII label can lose to a spurious guess.
    if let Some(candidate) = found.as_mut() {
        if !has_cjk(&candidate.value) && title.is_some_and(has_cjk) {
            let guess = name_shape_guess(&wide, title, config).filter(|g| has_cjk(g));
            if let Some(guess) = guess {
                tracing::debug!(from = %candidate.value, to = %guess, "CJK author override");
                candidate.value = guess;
                if let AuthorProvenance::Text { cjk_override, .. } = &mut candidate.provenance {
                    *cjk_override = true;
                }
            }
        }
    }

    let found = found.or_else(|| {
        metadata.author().map(|value| FieldCandidate {
            value: value.to_string(),
            provenance: AuthorProvenance::Metadata,
        })
    })?;

    let placeholders = config.author_placeholders();
    if placeholders.contains(&found.value.trim().to_lowercase()) {
        tracing::debug!(author = %found.value, provenance = %found.provenance, "placeholder author suppressed");
        return None;
    }

    let value = longest_cjk_run(&reorder_given_surname(&found.value));
    if value.is_empty() {
        return None;
    }
    tracing::debug!(author = %value, provenance = %found.provenance, "author resolved");
    Some(FieldCandidate {
        value,
        provenance: found.provenance,
    })
}

/// First labeled author value in the scan window.
fn label_match(lines: &[&str], config: &ExtractionConfig) -> Option<String> {
    let scan = &lines[..lines.len().min(config.author_scan_lines)];
    for (i, line) in scan.iter().enumerate() {
        for rule in AUTHOR_LABEL_REGEXES.iter() {
            let Some(caps) = rule.regex.captures(line) else {
                continue;
            };
            let name = caps["name"].trim();
            if name.is_empty() || char_len(name) > config.label_value_max_chars {
                tracing::trace!(rule = %rule.name, "author label value rejected");
                continue;
            }
            tracing::trace!(rule = %rule.name, line = i, "author label matched");
            return Some(name.to_string());
        }

        if AUTHOR_HEADER_REGEX.regex.is_match(line) {
            if let Some(next) = lines.get(i + 1) {
                let next = next.trim();
                let n = char_len(next);
                if n > 1 && n <= config.next_line_max_chars {
                    tracing::trace!(rule = %AUTHOR_HEADER_REGEX.name, line = i + 1, "author on next line");
                    return Some(next.to_string());
                }
            }
        }
    }
    None
}

/// A bare name-shaped line, with the optional inner space removed.
fn name_shape(line: &str) -> Option<String> {
    let caps = NAME_SHAPE_RE.captures(line.trim())?;
    Some(format!("{}{}", &caps[1], &caps[2]))
}

fn contains_any(s: &str, words: &[&str]) -> bool {
    words.iter().any(|w| s.contains(w))
}

/// Name-shaped line within `advisor_radius` lines of advisor vocabulary.
fn advisor_proximity(lines: &[&str], config: &ExtractionConfig) -> Option<String> {
    let scan = &lines[..lines.len().min(config.author_scan_lines)];
    for (i, line) in scan.iter().enumerate() {
        if !ADVISOR_CONTEXT_RE.is_match(line) {
            continue;
        }
        let lo = i.saturating_sub(config.advisor_radius);
        let hi = lines.len().min(i + config.advisor_radius + 1);
        for (j, neighbour) in lines.iter().enumerate().take(hi).skip(lo) {
            if j == i {
                continue;
            }
            let Some(candidate) = name_shape(neighbour) else {
                continue;
            };
            if contains_any(&candidate, ADVISOR_STOPWORDS) || contains_any(&candidate, NAME_STOPWORDS) {
                tracing::trace!(candidate = %candidate, "advisor-proximity candidate is a stopword");
                continue;
            }
            tracing::trace!(candidate = %candidate, advisor_line = i, "name near advisor context");
            return Some(candidate);
        }
    }
    None
}

/// First name-shaped line near academic context, else the first name-shaped
/// line at all.
fn name_shape_guess(lines: &[&str], title: Option<&str>, config: &ExtractionConfig) -> Option<String> {
    let window = lines.len().min(config.name_guess_lines);
    let mut fallback = None;
    for (i, line) in lines[..window].iter().enumerate() {
        let Some(candidate) = name_shape(line) else {
            continue;
        };
        if contains_any(&candidate, NAME_STOPWORDS) {
            continue;
        }
        if title.is_some_and(|t| t.contains(candidate.as_str())) {
            tracing::trace!(candidate = %candidate, "name guess is part of the title");
            continue;
        }
        let lo = i.saturating_sub(config.context_radius);
        let hi = lines.len().min(i + config.context_radius + 1);
        if lines[lo..hi].iter().any(|l| contains_any(l, ACADEMIC_CONTEXT_TERMS)) {
            return Some(candidate);
        }
        if fallback.is_none() {
            fallback = Some(candidate);
        }
    }
    fallback
}

/// `大文 陳` (given name, space, one-character surname) becomes `陳大文`;
/// otherwise whitespace runs are collapsed.
fn reorder_given_surname(name: &str) -> String {
    static GIVEN_SURNAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"^([{CJK_CLASS}]{{1,3}})\s+([{CJK_CLASS}])$")).unwrap());

    let s = name.trim();
    if let Some(caps) = GIVEN_SURNAME_RE.captures(s) {
        return format!("{}{}", &caps[2], &caps[1]);
    }
    collapse_whitespace(s)
}

/// Keep only the longest CJK run (first on ties) when one exists.
fn longest_cjk_run(name: &str) -> String {
    static CJK_RUN_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"[{CJK_CLASS}]+")).unwrap());

    let mut best: Option<&str> = None;
    for m in CJK_RUN_RE.find_iter(name) {
        if best.is_none_or(|b| char_len(m.as_str()) > char_len(b)) {
            best = Some(m.as_str());
        }
    }
    best.unwrap_or(name).trim().to_string()
}
