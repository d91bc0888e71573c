use once_cell::sync::Lazy;
use regex::Regex;

use paperfields_core::LineRecord;

use crate::rules::{AFFILIATION_RE, SOFT_HEADER_RE};

/// The CJK ranges of [`is_cjk`] as a regex character-class body.
pub(crate) const CJK_CLASS: &str =
    r"\x{2E80}-\x{2FFF}\x{3000}-\x{303F}\x{31C0}-\x{31EF}\x{3400}-\x{4DBF}\x{4E00}-\x{9FFF}\x{F900}-\x{FAFF}";

/// Whether `c` falls in one of the CJK ranges used as a proxy for Chinese text
/// (radicals, CJK punctuation, strokes, unified ideographs and extension A,
/// compatibility ideographs).
pub fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{2E80}'..='\u{2FFF}'
            | '\u{3000}'..='\u{303F}'
            | '\u{31C0}'..='\u{31EF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
    )
}

pub fn has_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Character count, which is what every length bound in this crate measures.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Python-style `isupper`: at least one cased character and no lowercase ones.
pub(crate) fn is_all_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Whether the trimmed line is an English "Abstract" heading (any case,
/// optionally followed by inline content).
pub fn is_abstract_header(line: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^abstract\b").unwrap());
    RE.is_match(line.trim())
}

/// Index of the first Abstract heading, if any.
pub(crate) fn find_abstract_header(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|l| is_abstract_header(l))
}

/// Lines before the first Abstract heading (all lines when there is none).
pub(crate) fn before_abstract<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    match find_abstract_header(lines) {
        Some(idx) => &lines[..idx],
        None => lines,
    }
}

/// Rough check for author/affiliation/contact lines on an English title page.
///
/// Blank lines count as affiliation lines so that they separate title runs.
pub fn looks_like_affiliation(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() {
        return true;
    }
    if AFFILIATION_RE.is_match(s) {
        return true;
    }
    // author lists and postal addresses
    if s.matches(',').count() >= 2 && char_len(s) <= 120 {
        return true;
    }
    // running heads
    char_len(s) <= 6 && is_all_upper(s)
}

/// Whether a line reads like a section heading: a short all-caps ASCII line,
/// or one that opens with a common heading word in either script.
pub fn looks_like_section_header(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() {
        return false;
    }
    if char_len(s) <= 60 && s.is_ascii() && is_all_upper(s) {
        return true;
    }
    SOFT_HEADER_RE.is_match(s)
}

fn is_weak_punct(c: char) -> bool {
    matches!(
        c,
        '，' | '。' | '、' | '；' | '：' | '！' | '？' | ',' | '.' | ';' | ':' | '!' | '(' | ')'
            | '（' | '）' | '[' | ']' | '【' | '】' | '·' | '-' | '—' | '_' | '/' | '|'
    )
}

/// Separators that never end a title: commas, brackets, dashes and slashes.
fn is_non_terminal_punct(c: char) -> bool {
    matches!(
        c,
        '，' | ',' | '、' | '(' | ')' | '（' | '）' | '[' | ']' | '【' | '】' | '·' | '-' | '—'
            | '_' | '/' | '|'
    )
}

/// Strip whitespace and weak punctuation so titles can be compared as plain
/// character runs regardless of line breaks and separators.
pub fn canonicalize(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_whitespace() && !is_weak_punct(c))
        .collect()
}

/// Like [`canonicalize`], but keeps sentence terminators and returns, for each
/// kept character, its char index in `text`.
pub fn canonicalize_with_map(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut chars = Vec::new();
    let mut map = Vec::new();
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() || is_non_terminal_punct(c) {
            continue;
        }
        chars.push(c);
        map.push(i);
    }
    (chars, map)
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join lines, merging a trailing ASCII hyphen with a next line that starts
/// lowercase (`"detec-"` + `"tion"` → `"detection"`). Other line breaks are kept.
pub fn join_with_hyphen_fix<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref();
        if let Some(prev) = out.last_mut() {
            if prev.ends_with('-') && line.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
                prev.pop();
                prev.push_str(line.trim_start());
                continue;
            }
        }
        out.push(line.to_string());
    }
    out.join("\n")
}

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Text of the lines on the first `n_pages` pages, capped at `max_lines`.
pub fn first_pages(lines: &[LineRecord], n_pages: usize, max_lines: usize) -> Vec<&str> {
    lines
        .iter()
        .take_while(|l| l.page < n_pages)
        .take(max_lines)
        .map(|l| l.text.as_str())
        .collect()
}
