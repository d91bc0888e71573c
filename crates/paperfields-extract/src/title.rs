use once_cell::sync::Lazy;
use regex::Regex;

use paperfields_core::DocumentMetadata;

use crate::FieldCandidate;
use crate::config::ExtractionConfig;
use crate::rules::{
    FILENAME_DATE_SUFFIX_RE, FILENAME_PREFIX_RE, NARRATIVE_OPENERS, SECTION_LABEL_TERMS,
    TITLE_DENY_TERMS, TITLE_VERSION_SUFFIX_RE,
};
use crate::text::{
    CJK_CLASS, before_abstract, canonicalize, canonicalize_with_map, char_len,
    collapse_whitespace, has_cjk, is_cjk, looks_like_affiliation,
};

/// Title candidate sources, tried in [`TITLE_STRATEGIES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Metadata title that looks like a real multi-word title.
    MetadataQualified,
    /// English in-text title, when the filename gives no usable hint.
    PreferredEnglish,
    /// Longer line containing the filename title.
    FilenameSuperstring,
    /// Filename title extended with the text that follows it in the document.
    RightContext,
    Filename,
    ChineseText,
    EnglishText,
    /// Any sanitized metadata title, however short.
    MetadataRaw,
}

impl TitleStrategy {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::MetadataQualified => "metadata",
            Self::PreferredEnglish => "english-preferred",
            Self::FilenameSuperstring => "superstring",
            Self::RightContext => "right-context",
            Self::Filename => "filename",
            Self::ChineseText => "chinese-text",
            Self::EnglishText => "english-text",
            Self::MetadataRaw => "metadata-raw",
        }
    }

    fn attempt(&self, inputs: &TitleInputs<'_>) -> Option<String> {
        let config = inputs.config;
        let filename_title = inputs.filename_title.as_str();
        match self {
            Self::MetadataQualified => inputs.metadata.title().filter(|t| {
                char_len(t) >= 10 && (t.contains(' ') || t.contains('-'))
            }).map(str::to_string),
            Self::PreferredEnglish => {
                let filename_unhelpful = filename_title.is_empty()
                    || (!has_cjk(filename_title) && is_code_like_stem(inputs.stem));
                if filename_unhelpful {
                    english_title_from_lines(inputs.lines, config)
                } else {
                    None
                }
            }
            Self::FilenameSuperstring => {
                expand_by_superstring(filename_title, inputs.lines, config)
            }
            Self::RightContext => expand_by_right_context(filename_title, inputs.lines, config),
            Self::Filename => Some(filename_title.to_string()).filter(|t| !t.is_empty()),
            Self::ChineseText => chinese_title_from_lines(inputs.lines, config),
            Self::EnglishText => english_title_from_lines(inputs.lines, config),
            Self::MetadataRaw => inputs.metadata.title().map(str::to_string),
        }
    }
}

/// Selection policy: the first strategy producing a value wins.
pub const TITLE_STRATEGIES: &[TitleStrategy] = &[
    TitleStrategy::MetadataQualified,
    TitleStrategy::PreferredEnglish,
    TitleStrategy::FilenameSuperstring,
    TitleStrategy::RightContext,
    TitleStrategy::Filename,
    TitleStrategy::ChineseText,
    TitleStrategy::EnglishText,
    TitleStrategy::MetadataRaw,
];

struct TitleInputs<'a> {
    lines: &'a [&'a str],
    stem: &'a str,
    filename_title: String,
    metadata: &'a DocumentMetadata,
    config: &'a ExtractionConfig,
}

/// Resolve and normalize the title from the sampled lines, the filename stem
/// and the metadata.
pub fn resolve_title(
    lines: &[&str],
    stem: &str,
    metadata: &DocumentMetadata,
    config: &ExtractionConfig,
) -> Option<FieldCandidate<TitleStrategy>> {
    let inputs = TitleInputs {
        lines,
        stem,
        filename_title: title_from_filename(stem),
        metadata,
        config,
    };

    for strategy in TITLE_STRATEGIES {
        if let Some(raw) = strategy.attempt(&inputs) {
            let value = normalize_title(&raw);
            tracing::debug!(strategy = strategy.tag(), title = %value, "title resolved");
            if value.is_empty() {
                return None;
            }
            return Some(FieldCandidate {
                value,
                provenance: *strategy,
            });
        }
        tracing::trace!(strategy = strategy.tag(), "no title candidate");
    }
    None
}

/// Derive a title hint from a filename stem: drop directory-style prefixes
/// (`基礎3_`), a trailing `_YYYY`/`_YYYYMMDD`, and underscores.
pub fn title_from_filename(stem: &str) -> String {
    let s = FILENAME_PREFIX_RE.replace(stem, "");
    let s = FILENAME_DATE_SUFFIX_RE.replace(&s, "");
    s.replace('_', "").trim().to_string()
}

/// Stems like `s41586-021-03819-2` or `paper_v2` are codes, not titles.
fn is_code_like_stem(stem: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{1,30}$").unwrap());
    RE.is_match(stem)
}

fn has_deny_term(s: &str) -> bool {
    TITLE_DENY_TERMS.iter().any(|t| s.contains(t))
}

fn ends_with_terminator(s: &str) -> bool {
    s.ends_with('。') || s.ends_with(':') || s.ends_with('：')
}

/// First longest string; ties keep the earliest.
fn longest(candidates: Vec<&str>) -> Option<String> {
    let mut best: Option<&str> = None;
    for c in candidates {
        if best.is_none_or(|b| char_len(c) > char_len(b)) {
            best = Some(c);
        }
    }
    best.map(str::to_string)
}

/// Multi-line English title above the Abstract heading.
///
/// Affiliation-like lines are skipped until the first title line, then end the
/// run. At most `english_title_max_lines` lines are joined.
pub fn english_title_from_lines(lines: &[&str], config: &ExtractionConfig) -> Option<String> {
    let head = &lines[..lines.len().min(config.title_head_lines)];
    let window = before_abstract(head);

    let mut run: Vec<&str> = Vec::new();
    for line in window {
        if looks_like_affiliation(line) {
            if run.is_empty() {
                continue;
            }
            break;
        }
        run.push(line.trim());
        if run.len() >= config.english_title_max_lines {
            break;
        }
    }
    if run.is_empty() {
        return None;
    }

    let mut merged: Vec<String> = Vec::new();
    for line in run {
        if let Some(prev) = merged.last_mut() {
            if prev.ends_with('-') && line.chars().next().is_some_and(char::is_lowercase) {
                prev.pop();
                prev.push_str(line.trim_start());
                continue;
            }
        }
        merged.push(line.to_string());
    }
    let title = collapse_whitespace(&merged.join(" "));

    if char_len(&title) < config.english_title_min_chars
        || title.split_whitespace().count() < config.english_title_min_words
    {
        tracing::trace!(candidate = %title, "english title too short");
        return None;
    }
    Some(title)
}

/// Single-line Chinese title above the Abstract heading; the longest line
/// that survives the front-matter filters wins.
pub fn chinese_title_from_lines(lines: &[&str], config: &ExtractionConfig) -> Option<String> {
    // decimal digits only; roman numerals and 〇 do not count
    static DECIMAL_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Nd}").unwrap());

    let head = &lines[..lines.len().min(config.title_head_lines)];
    let window = before_abstract(head);
    let window = &window[..window.len().min(config.chinese_title_window)];

    let sentence_punct = |c: char| {
        matches!(
            c,
            '，' | '。' | '、' | '；' | '：' | '！' | '？' | '(' | ')' | '（' | '）' | '[' | ']'
                | '【' | '】' | '·'
        )
    };

    let candidates: Vec<&str> = window
        .iter()
        .map(|l| l.trim())
        .filter(|s| !s.is_empty() && has_cjk(s))
        .filter(|s| !has_deny_term(s))
        .filter(|s| !NARRATIVE_OPENERS.iter().any(|o| s.starts_with(o)))
        .filter(|s| !s.chars().any(sentence_punct) && !ends_with_terminator(s))
        .filter(|s| DECIMAL_DIGIT_RE.find_iter(s).count() < 2)
        .filter(|s| {
            let n = char_len(s);
            n >= config.chinese_title_min_chars && n <= config.chinese_title_max_chars
        })
        .collect();

    longest(candidates)
}

/// Find a longer line that contains the (CJK) filename title, which usually
/// means the filename carries an abbreviated form of the real title.
pub fn expand_by_superstring(
    filename_title: &str,
    lines: &[&str],
    config: &ExtractionConfig,
) -> Option<String> {
    static START_HEADER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:摘要|Abstract|ABSTRACT)\b").unwrap());

    if filename_title.is_empty() || !has_cjk(filename_title) {
        return None;
    }
    let base = canonicalize(filename_title.trim());
    let base_len = char_len(&base);
    if base_len < 4 {
        return None;
    }

    let punct = |c: char| {
        matches!(
            c,
            '，' | '。' | '、' | '；' | '：' | '！' | '？' | '(' | ')' | '（' | '）' | '[' | ']'
                | '【' | '】' | '·' | ',' | '.' | ';' | ':' | '!'
        )
    };
    let qualifies = |s: &str| {
        if s.is_empty() || !has_cjk(s) || has_deny_term(s) || ends_with_terminator(s) {
            return false;
        }
        if s.chars().filter(|&c| punct(c)).count() > 3 {
            return false;
        }
        let canon = canonicalize(s);
        char_len(&canon) > base_len + 1
            && canon.contains(&base)
            && char_len(s) <= config.superstring_max_chars
    };

    let head = &lines[..lines.len().min(config.title_head_lines)];
    let window = before_abstract(head);
    let candidates: Vec<&str> = window.iter().map(|l| l.trim()).filter(|s| qualifies(s)).collect();
    if !candidates.is_empty() {
        return longest(candidates);
    }

    // Nothing before the Abstract heading; retry over the top of the document.
    let retry = &head[..head.len().min(config.chinese_title_window)];
    let candidates: Vec<&str> = retry
        .iter()
        .map(|l| l.trim())
        .filter(|s| !START_HEADER_RE.is_match(s))
        .filter(|s| qualifies(s))
        .collect();
    longest(candidates)
}

/// Extend the (CJK) filename title rightward through the document text, for
/// filenames that truncate the title.
pub fn expand_by_right_context(
    filename_title: &str,
    lines: &[&str],
    config: &ExtractionConfig,
) -> Option<String> {
    const TERMINATORS: &[char] = &['。', '；', '！', '？', '：', ':'];

    if filename_title.is_empty() || !has_cjk(filename_title) {
        return None;
    }
    let (base, _) = canonicalize_with_map(filename_title);
    if base.len() < 4 {
        return None;
    }

    let head = &lines[..lines.len().min(config.right_context_window)];
    let original: Vec<char> = before_abstract(head).join("\n").chars().collect();
    let raw: String = original.iter().collect();
    let (canon, map) = canonicalize_with_map(&raw);

    let pos = canon.windows(base.len()).position(|w| w == base.as_slice())?;
    let start = map[pos];
    let end = map[pos + base.len() - 1];

    let mut cur = end + 1;
    let mut steps = 0;
    let mut crossed_break = false;
    while cur < original.len() && steps < config.right_context_max_extra {
        let ch = original[cur];
        if TERMINATORS.contains(&ch) {
            break;
        }
        if ch == '\n' {
            if crossed_break {
                break;
            }
            let next_end = original[cur + 1..]
                .iter()
                .position(|&c| c == '\n')
                .map_or(original.len(), |p| cur + 1 + p);
            let next_line: String = original[cur + 1..next_end].iter().collect();
            let next_line = next_line.trim();
            let continues = !next_line.is_empty()
                && has_cjk(next_line)
                && !SECTION_LABEL_TERMS.iter().any(|t| next_line.contains(t))
                && !ends_with_terminator(next_line);
            if !continues {
                break;
            }
            crossed_break = true;
        }
        cur += 1;
        steps += 1;
    }

    let candidate: String = original[start..cur].iter().filter(|&&c| c != '\n').collect();
    let candidate = candidate.trim();
    let extra_cjk = original[end + 1..cur].iter().filter(|&&c| is_cjk(c)).count();

    if char_len(candidate) <= char_len(filename_title) + 1
        || ends_with_terminator(candidate)
        || char_len(candidate) > config.right_context_max_chars
        || extra_cjk < 2
        || has_deny_term(candidate)
    {
        tracing::trace!(candidate, "right-context expansion rejected");
        return None;
    }
    Some(candidate.to_string())
}

/// Normalize a resolved title. Applying it twice gives the same result.
///
/// - newlines become spaces
/// - trailing finality/version markers (`定稿`, `final`, `v2`, ...) are dropped
/// - hyphens next to CJK text are removed (`RBF-UNet` keeps its hyphen)
/// - one space separates CJK from ASCII letters/digits
/// - whitespace runs collapse to one space
pub fn normalize_title(title: &str) -> String {
    let mut current = normalize_once(title);
    for _ in 0..4 {
        let next = normalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalize_once(title: &str) -> String {
    static CJK_THEN_HYPHEN: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"([{CJK_CLASS}])\s*-\s*")).unwrap());
    static HYPHEN_THEN_CJK: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"\s*-\s*([{CJK_CLASS}])")).unwrap());
    static CJK_THEN_ASCII: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"([{CJK_CLASS}])([A-Za-z0-9])")).unwrap());
    static ASCII_THEN_CJK: Lazy<Regex> =
        Lazy::new(|| Regex::new(&format!(r"([A-Za-z0-9])([{CJK_CLASS}])")).unwrap());

    let mut t = title.trim().replace(['\r', '\n'], " ");
    loop {
        let stripped = TITLE_VERSION_SUFFIX_RE.replace(&t, "").into_owned();
        if stripped == t {
            break;
        }
        t = stripped;
    }
    let t = CJK_THEN_HYPHEN.replace_all(&t, "${1}");
    let t = HYPHEN_THEN_CJK.replace_all(&t, "${1}");
    let t = CJK_THEN_ASCII.replace_all(&t, "${1} ${2}");
    let t = ASCII_THEN_CJK.replace_all(&t, "${1} ${2}");
    collapse_whitespace(&t)
}
