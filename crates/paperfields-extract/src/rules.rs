//! Rule tables shared by the resolvers.
//!
//! Every pattern and vocabulary list lives here as a named constant so that
//! individual rules can be exercised in isolation and overridden through
//! [`ExtractionConfig`](crate::ExtractionConfig). Bump [`RULES_VERSION`] whenever
//! a table changes meaning.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Revision of the rule tables below.
pub const RULES_VERSION: u32 = 1;

/// A regex with a stable descriptive name, reported as a marker tag.
#[derive(Debug, Clone)]
pub struct NamedRegex {
    pub name: String,
    pub regex: Regex,
}

impl NamedRegex {
    /// Compile `pattern` case-insensitively.
    pub fn new(name: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            regex: RegexBuilder::new(pattern).case_insensitive(true).build()?,
        })
    }
}

fn compile_table(table: &[(&str, &str)]) -> Vec<NamedRegex> {
    table
        .iter()
        .map(|(name, pattern)| NamedRegex::new(name, pattern).unwrap())
        .collect()
}

// ── Abstract span ──

/// Abstract start rules, tried in order on every line. Rules with an
/// `inline` group carry the first sentence of the abstract on the header line.
pub const START_RULES: &[(&str, &str)] = &[
    ("zh_header", r"^\s*(?:中文)?摘要\s*[：:]?\s*$"),
    ("zh_inline", r"^\s*摘要\s*[：:]\s*(?P<inline>.+)$"),
    ("zh_full_inline", r"^\s*中文摘要\s*[：:]\s*(?P<inline>.+)$"),
    ("en_header_upper", r"(?-i)^\s*ABSTRACT\s*[：:]?\s*$"),
    ("en_header", r"^\s*Abstract\s*[：:]?\s*$"),
    ("en_inline", r"^\s*Abstract\s*[：:]\s*(?P<inline>.+)$"),
];

/// Hard end-of-abstract rules, tried in order.
pub const END_RULES: &[(&str, &str)] = &[
    ("keywords_zh", r"^\s*(?:關鍵[詞字]|关键词)\s*[：:]?\b"),
    ("keywords_en", r"^\s*Keywords?\b"),
    ("index_terms", r"^\s*Index\s+Terms\b"),
    ("toc", r"^\s*(?:目錄|目次)\s*$"),
    ("references", r"^\s*(?:參考文獻|参考文献|References)\b"),
    ("acknowledgments", r"^\s*(?:致謝|誌謝)\b"),
    ("intro_zh", r"^\s*(?:引言|緒論)\b"),
    ("intro_en", r"^\s*Introduction\b"),
    ("numbered_section", r"^\s*\d+\s*[.|、]\s*\S+"),
    ("zh_numbered_section", r"^\s*[一二三四五六七八九十]+、"),
];

pub static START_REGEXES: Lazy<Vec<NamedRegex>> = Lazy::new(|| compile_table(START_RULES));
pub static END_REGEXES: Lazy<Vec<NamedRegex>> = Lazy::new(|| compile_table(END_RULES));

/// Heading words that end an abstract softly once enough lines were collected.
pub static SOFT_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Abstract|ABSTRACT|Introduction|Conclusions?|摘要|引言|結論|結語|緒論|關鍵字|目錄)\b")
        .unwrap()
});

/// Trailing page-number artifacts: roman numerals or 1–3 digits.
pub static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[ivxlcdmIVXLCDM]{1,4}\.?|\d{1,3})$").unwrap());

// ── Author ──

/// Author label rules with an inline value, tried in order on every line.
pub const AUTHOR_LABEL_RULES: &[(&str, &str)] = &[
    ("zh_author", r"^\s*作者\s*[：:]\s*(?P<name>.+?)\s*$"),
    (
        "zh_student",
        r"^\s*(?:研究生|研 究 生|學生|学生)\s*[：:]?\s*(?P<name>[\x{4E00}-\x{9FFF}A-Za-z .・．。-]{2,})\s*$",
    ),
    (
        "zh_name",
        r"^\s*姓\s*名\s*[：:]?\s*(?P<name>[\x{4E00}-\x{9FFF}A-Za-z .・．。-]{2,})\s*$",
    ),
    (
        "zh_thesis_author",
        r"^\s*(?:論文作者|作者姓名|畢業生)\s*[：:]?\s*(?P<name>[\x{4E00}-\x{9FFF}A-Za-z .・．。-]{2,})\s*$",
    ),
    ("en_author", r"^\s*Authors?\s*[：:]\s*(?P<name>.+?)\s*$"),
    ("en_student", r"^\s*Student\b\s*[：:]\s*(?P<name>.+?)\s*$"),
];

/// A Chinese author label standing alone; the name is on the next line.
pub const AUTHOR_HEADER_RULE: (&str, &str) = (
    "zh_label_next_line",
    r"^\s*(?:作者|研究生|研 究 生|學生|学生|姓\s*名|論文作者|作者姓名|畢業生)\s*[：:]?\s*$",
);

pub static AUTHOR_LABEL_REGEXES: Lazy<Vec<NamedRegex>> =
    Lazy::new(|| compile_table(AUTHOR_LABEL_RULES));
pub static AUTHOR_HEADER_REGEX: Lazy<NamedRegex> =
    Lazy::new(|| NamedRegex::new(AUTHOR_HEADER_RULE.0, AUTHOR_HEADER_RULE.1).unwrap());

/// A line holding nothing but a 2–4 character Chinese name, optionally split
/// by one space between given name and surname parts.
pub static NAME_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\x{3000}]*([\x{4E00}-\x{9FFF}]{1,2})\s?([\x{4E00}-\x{9FFF}]{1,2})[\s\x{3000}]*$")
        .unwrap()
});

/// Advisor/supervisor vocabulary marking the signature block of a thesis cover.
pub static ADVISOR_CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:指導|導師|教授|Advisor|Supervisor)").unwrap());

/// Degree and institution words that are never part of a name near an advisor line.
pub const ADVISOR_STOPWORDS: &[&str] = &[
    "碩士", "博士", "論文", "學位", "學校", "大學", "學院", "系", "所", "致謝", "誌謝", "謝辭",
];

/// Generic thesis, section and role words that look like 2–4 character names.
pub const NAME_STOPWORDS: &[&str] = &[
    // sections
    "摘要", "中文摘要", "英文摘要", "Abstract", "ABSTRACT",
    "關鍵字", "关键词", "關鍵詞", "Keywords", "Index Terms",
    "目錄", "目次", "附錄",
    "引言", "緒論", "前言", "導論",
    "參考文獻", "参考文献", "References",
    "方法", "結果", "討論", "結論",
    // roles and labels
    "作者", "作者姓名", "論文作者", "姓名",
    "研究生", "學生", "學生姓名",
    "指導", "導師", "指導教授", "教授",
    // schools and degrees
    "大學", "學校", "學院", "系", "所", "研究所", "學位", "學程", "學號",
    // cover and approval pages
    "致謝", "誌謝", "謝辭", "封面", "審定書", "口試委員", "委員",
];

/// Academic context that makes a nearby name-shaped line more credible.
pub const ACADEMIC_CONTEXT_TERMS: &[&str] = &[
    "大學", "學校", "學院", "系", "所", "研究所", "學位", "論文", "指導", "教授", "學號",
];

/// Author values that are tool defaults rather than people.
pub const AUTHOR_PLACEHOLDERS: &[&str] = &["user", "admin", "unknown", "untitled", "test"];

// ── Title ──

/// Institutional and thesis-front-matter vocabulary that disqualifies a title line.
pub const TITLE_DENY_TERMS: &[&str] = &[
    "大學", "學校", "學院", "系", "所", "研究所", "學位", "指導", "導師", "教授", "學號",
    "目錄", "目次", "致謝", "誌謝", "謝辭", "關鍵字", "关键词",
];

/// Sentence openers typical of abstract prose, not titles.
pub const NARRATIVE_OPENERS: &[&str] = &[
    "本研究", "本文", "本論文", "因此", "然而", "在本研究中", "在本論文中",
];

/// Labels that stop a title from continuing onto the next line.
pub const SECTION_LABEL_TERMS: &[&str] = &[
    "關鍵字", "关键词", "摘要", "Abstract", "ABSTRACT", "目錄", "目次",
];

/// Directory-style filename prefixes such as `基礎3_`.
pub static FILENAME_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:基礎|標準|查詢)\d+_").unwrap());

/// Trailing `_YYYY` or `_YYYYMMDD` on a filename stem.
pub static FILENAME_DATE_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(?:19|20)\d{2}(?:\d{4})?$").unwrap());

/// Trailing finality/version markers left over from file names.
pub static TITLE_VERSION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s\-_/·]*\(?(?:最終版|最終|定稿|定版|final|FINAL|Final|修訂版|修正版|v\d{1,3})\)?\s*$")
        .unwrap()
});

/// Affiliation and contact vocabulary on English title pages.
pub static AFFILIATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)@|Department|School|University|College|Faculty|Institute|Laborator(?:y|ies)|Centre|Center|Affiliation|Corresponding\s+author|Article\s+history|Received|Accepted|Published|ORCID|Keywords?|Index\s+Terms",
    )
    .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'a>(table: &'a [NamedRegex], name: &str) -> &'a Regex {
        &table.iter().find(|r| r.name == name).unwrap().regex
    }

    #[test]
    fn test_tables_compile() {
        assert_eq!(START_REGEXES.len(), START_RULES.len());
        assert_eq!(END_REGEXES.len(), END_RULES.len());
        assert_eq!(AUTHOR_LABEL_REGEXES.len(), AUTHOR_LABEL_RULES.len());
        Lazy::force(&AUTHOR_HEADER_REGEX);
    }

    #[test]
    fn test_start_rules() {
        let zh = rule(&START_REGEXES, "zh_header");
        assert!(zh.is_match("摘要"));
        assert!(zh.is_match("  中文摘要："));
        assert!(!zh.is_match("摘要：本研究"));

        let inline = rule(&START_REGEXES, "zh_inline");
        let caps = inline.captures("摘要：本研究探討").unwrap();
        assert_eq!(&caps["inline"], "本研究探討");

        let upper = rule(&START_REGEXES, "en_header_upper");
        assert!(upper.is_match("ABSTRACT"));
        assert!(!upper.is_match("Abstract"));

        let en = rule(&START_REGEXES, "en_header");
        assert!(en.is_match("ABSTRACT"));
        assert!(en.is_match("Abstract:"));
        assert!(!en.is_match("Abstract: We study"));

        let en_inline = rule(&START_REGEXES, "en_inline");
        assert_eq!(&en_inline.captures("abstract: We study").unwrap()["inline"], "We study");
    }

    #[test]
    fn test_end_rules() {
        assert!(rule(&END_REGEXES, "keywords_zh").is_match("關鍵字：教育、科技"));
        assert!(rule(&END_REGEXES, "keywords_zh").is_match("关键词"));
        assert!(rule(&END_REGEXES, "keywords_en").is_match("KEYWORDS: a, b"));
        assert!(rule(&END_REGEXES, "index_terms").is_match("Index Terms—deep learning"));
        assert!(rule(&END_REGEXES, "toc").is_match("目錄"));
        assert!(!rule(&END_REGEXES, "toc").is_match("目錄一"));
        assert!(rule(&END_REGEXES, "references").is_match("References"));
        assert!(rule(&END_REGEXES, "acknowledgments").is_match("誌謝"));
        assert!(rule(&END_REGEXES, "intro_zh").is_match("緒論"));
        assert!(rule(&END_REGEXES, "intro_en").is_match("INTRODUCTION"));
        assert!(rule(&END_REGEXES, "numbered_section").is_match("1. Introduction"));
        assert!(rule(&END_REGEXES, "numbered_section").is_match("2、研究方法"));
        assert!(rule(&END_REGEXES, "zh_numbered_section").is_match("三、結果"));
        assert!(!rule(&END_REGEXES, "numbered_section").is_match("This paper presents"));
    }

    #[test]
    fn test_author_label_rules() {
        let author = rule(&AUTHOR_LABEL_REGEXES, "zh_author");
        assert_eq!(&author.captures("作者：王小明").unwrap()["name"], "王小明");

        let student = rule(&AUTHOR_LABEL_REGEXES, "zh_student");
        assert_eq!(student.captures("研究生：林 大 同").unwrap()["name"].trim(), "林 大 同");
        assert!(!student.is_match("研究生："));

        let name = rule(&AUTHOR_LABEL_REGEXES, "zh_name");
        assert_eq!(name.captures("姓 名 陳美玲").unwrap()["name"].trim(), "陳美玲");

        let en = rule(&AUTHOR_LABEL_REGEXES, "en_author");
        assert_eq!(&en.captures("AUTHORS: Jane Doe").unwrap()["name"], "Jane Doe");

        assert!(AUTHOR_HEADER_REGEX.regex.is_match("作者"));
        assert!(AUTHOR_HEADER_REGEX.regex.is_match("研 究 生："));
        assert!(!AUTHOR_HEADER_REGEX.regex.is_match("作者：王小明"));
    }

    #[test]
    fn test_name_shape() {
        let caps = NAME_SHAPE_RE.captures("  陳 大文 ").unwrap();
        assert_eq!(format!("{}{}", &caps[1], &caps[2]), "陳大文");
        assert!(NAME_SHAPE_RE.is_match("王小明"));
        assert!(!NAME_SHAPE_RE.is_match("王"));
        assert!(!NAME_SHAPE_RE.is_match("智慧型感測系統"));
        assert!(!NAME_SHAPE_RE.is_match("王小明："));
    }

    #[test]
    fn test_version_suffix() {
        assert!(TITLE_VERSION_SUFFIX_RE.is_match("深度學習研究_定稿"));
        assert!(TITLE_VERSION_SUFFIX_RE.is_match("A Study (v12)"));
        assert!(!TITLE_VERSION_SUFFIX_RE.is_match("A Study of Things"));
    }
}
