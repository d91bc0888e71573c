use once_cell::sync::Lazy;

use paperfields_core::ConfigFile;

use crate::rules::{AUTHOR_PLACEHOLDERS, END_REGEXES, NamedRegex};

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the field resolvers.
///
/// Every numeric threshold here is an uncalibrated heuristic carried over as a
/// named default; change them only against a labeled corpus. Use
/// [`ExtractionConfigBuilder`] to construct a non-default config.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    // ── abstract_span.rs ──
    /// Maximum number of pages an abstract may span (default: 3).
    pub(crate) max_abstract_pages: usize,
    /// Lines that must be collected before a heading-like line ends the abstract (default: 5).
    pub(crate) soft_end_min_lines: usize,
    /// Hard end-of-abstract rules.
    pub(crate) end_rules: ListOverride<NamedRegex>,

    // ── title.rs ──
    /// Pages sampled for in-text title candidates (default: 5).
    pub(crate) title_sample_pages: usize,
    /// Line cap for every page sample (default: 300).
    pub(crate) sample_max_lines: usize,
    /// Lines scanned for English titles and superstring expansion (default: 200).
    pub(crate) title_head_lines: usize,
    /// Lines scanned for Chinese titles and the superstring retry (default: 120).
    pub(crate) chinese_title_window: usize,
    pub(crate) chinese_title_min_chars: usize,
    pub(crate) chinese_title_max_chars: usize,
    pub(crate) english_title_max_lines: usize,
    pub(crate) english_title_min_chars: usize,
    pub(crate) english_title_min_words: usize,
    /// Raw length cap for a filename superstring line (default: 80).
    pub(crate) superstring_max_chars: usize,
    /// Characters a right-context expansion may add (default: 60).
    pub(crate) right_context_max_extra: usize,
    /// Length cap for a right-context expansion (default: 120).
    pub(crate) right_context_max_chars: usize,
    /// Lines searched for right-context expansion (default: 300).
    pub(crate) right_context_window: usize,

    // ── year.rs ──
    pub(crate) year_scan_pages: usize,

    // ── authors.rs ──
    pub(crate) author_narrow_pages: usize,
    pub(crate) author_wide_pages: usize,
    pub(crate) author_wide_max_lines: usize,
    /// Lines of a window scanned for labels and advisor context (default: 200).
    pub(crate) author_scan_lines: usize,
    /// Lines of a window scanned for bare name-shaped lines (default: 150).
    pub(crate) name_guess_lines: usize,
    pub(crate) advisor_radius: usize,
    pub(crate) context_radius: usize,
    pub(crate) label_value_max_chars: usize,
    pub(crate) next_line_max_chars: usize,
    pub(crate) author_placeholders: ListOverride<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_abstract_pages: 3,
            soft_end_min_lines: 5,
            end_rules: ListOverride::Default,
            title_sample_pages: 5,
            sample_max_lines: 300,
            title_head_lines: 200,
            chinese_title_window: 120,
            chinese_title_min_chars: 8,
            chinese_title_max_chars: 40,
            english_title_max_lines: 4,
            english_title_min_chars: 15,
            english_title_min_words: 4,
            superstring_max_chars: 80,
            right_context_max_extra: 60,
            right_context_max_chars: 120,
            right_context_window: 300,
            year_scan_pages: 3,
            author_narrow_pages: 3,
            author_wide_pages: 8,
            author_wide_max_lines: 800,
            author_scan_lines: 200,
            name_guess_lines: 150,
            advisor_radius: 5,
            context_radius: 3,
            label_value_max_chars: 100,
            next_line_max_chars: 30,
            author_placeholders: ListOverride::Default,
        }
    }
}

impl ExtractionConfig {
    /// Maximum number of pages an abstract may span.
    pub fn max_abstract_pages(&self) -> usize {
        self.max_abstract_pages
    }

    /// The resolved end-of-abstract rules, in the order they are tried.
    pub(crate) fn end_rules(&self) -> Vec<NamedRegex> {
        self.end_rules.resolve(&END_REGEXES)
    }

    /// The resolved placeholder author names (lowercase).
    pub(crate) fn author_placeholders(&self) -> Vec<String> {
        static DEFAULTS: Lazy<Vec<String>> =
            Lazy::new(|| AUTHOR_PLACEHOLDERS.iter().map(|s| s.to_string()).collect());
        self.author_placeholders
            .resolve(&DEFAULTS)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect()
    }
}

/// Builder for [`ExtractionConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    scalars: Scalars,
    end_rules: ListOverride<(String, String)>,
    author_placeholders: ListOverride<String>,
}

/// Scalar overrides; `None` keeps the default.
#[derive(Debug, Clone, Default)]
struct Scalars {
    max_abstract_pages: Option<usize>,
    soft_end_min_lines: Option<usize>,
    title_sample_pages: Option<usize>,
    superstring_max_chars: Option<usize>,
    right_context_max_extra: Option<usize>,
    right_context_max_chars: Option<usize>,
    chinese_title_min_chars: Option<usize>,
    chinese_title_max_chars: Option<usize>,
    author_narrow_pages: Option<usize>,
    author_wide_pages: Option<usize>,
    author_wide_max_lines: Option<usize>,
    advisor_radius: Option<usize>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from an on-disk [`ConfigFile`].
    pub fn from_config_file(file: &ConfigFile) -> Self {
        let mut builder = Self::new();
        if let Some(a) = &file.abstract_span {
            builder.scalars.max_abstract_pages = a.max_pages;
            builder.scalars.soft_end_min_lines = a.soft_end_min_lines;
            if let Some(patterns) = &a.extra_end_patterns {
                for (i, p) in patterns.iter().enumerate() {
                    builder = builder.add_end_pattern(&format!("custom_{}", i + 1), p);
                }
            }
        }
        if let Some(t) = &file.title {
            builder.scalars.title_sample_pages = t.sample_pages;
            builder.scalars.superstring_max_chars = t.superstring_max_chars;
            builder.scalars.right_context_max_extra = t.right_context_max_extra;
            builder.scalars.right_context_max_chars = t.right_context_max_chars;
            builder.scalars.chinese_title_min_chars = t.chinese_min_chars;
            builder.scalars.chinese_title_max_chars = t.chinese_max_chars;
        }
        if let Some(u) = &file.author {
            builder.scalars.author_narrow_pages = u.narrow_pages;
            builder.scalars.author_wide_pages = u.wide_pages;
            builder.scalars.author_wide_max_lines = u.wide_max_lines;
            builder.scalars.advisor_radius = u.advisor_radius;
            if let Some(extra) = &u.extra_placeholders {
                for p in extra {
                    builder = builder.add_author_placeholder(p.clone());
                }
            }
        }
        builder
    }

    // ── Abstract span ──

    pub fn max_abstract_pages(mut self, n: usize) -> Self {
        self.scalars.max_abstract_pages = Some(n);
        self
    }

    pub fn soft_end_min_lines(mut self, n: usize) -> Self {
        self.scalars.soft_end_min_lines = Some(n);
        self
    }

    /// Replace the built-in end rules with `(name, pattern)` pairs.
    pub fn set_end_patterns(mut self, rules: Vec<(String, String)>) -> Self {
        self.end_rules = ListOverride::Replace(rules);
        self
    }

    /// Append an end rule after the built-in ones. Patterns are case-insensitive.
    pub fn add_end_pattern(mut self, name: &str, pattern: &str) -> Self {
        let rule = (name.to_string(), pattern.to_string());
        match &mut self.end_rules {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(rule),
            ListOverride::Default => self.end_rules = ListOverride::Extend(vec![rule]),
        }
        self
    }

    // ── Title ──

    pub fn title_sample_pages(mut self, n: usize) -> Self {
        self.scalars.title_sample_pages = Some(n);
        self
    }

    pub fn superstring_max_chars(mut self, n: usize) -> Self {
        self.scalars.superstring_max_chars = Some(n);
        self
    }

    pub fn right_context_max_extra(mut self, n: usize) -> Self {
        self.scalars.right_context_max_extra = Some(n);
        self
    }

    pub fn right_context_max_chars(mut self, n: usize) -> Self {
        self.scalars.right_context_max_chars = Some(n);
        self
    }

    pub fn chinese_title_chars(mut self, min: usize, max: usize) -> Self {
        self.scalars.chinese_title_min_chars = Some(min);
        self.scalars.chinese_title_max_chars = Some(max);
        self
    }

    // ── Author ──

    pub fn author_narrow_pages(mut self, n: usize) -> Self {
        self.scalars.author_narrow_pages = Some(n);
        self
    }

    pub fn author_wide_pages(mut self, n: usize) -> Self {
        self.scalars.author_wide_pages = Some(n);
        self
    }

    pub fn author_wide_max_lines(mut self, n: usize) -> Self {
        self.scalars.author_wide_max_lines = Some(n);
        self
    }

    pub fn advisor_radius(mut self, n: usize) -> Self {
        self.scalars.advisor_radius = Some(n);
        self
    }

    pub fn set_author_placeholders(mut self, placeholders: Vec<String>) -> Self {
        self.author_placeholders = ListOverride::Replace(placeholders);
        self
    }

    pub fn add_author_placeholder(mut self, placeholder: String) -> Self {
        match &mut self.author_placeholders {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(placeholder),
            ListOverride::Default => {
                self.author_placeholders = ListOverride::Extend(vec![placeholder])
            }
        }
        self
    }

    /// Compile all string patterns into regexes and produce an [`ExtractionConfig`].
    pub fn build(self) -> Result<ExtractionConfig, regex::Error> {
        let compile = |rules: Vec<(String, String)>| -> Result<Vec<NamedRegex>, regex::Error> {
            rules
                .iter()
                .map(|(name, pattern)| NamedRegex::new(name, pattern))
                .collect()
        };

        let end_rules = match self.end_rules {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(rules) => ListOverride::Replace(compile(rules)?),
            ListOverride::Extend(rules) => ListOverride::Extend(compile(rules)?),
        };

        let d = ExtractionConfig::default();
        let s = self.scalars;
        Ok(ExtractionConfig {
            max_abstract_pages: s.max_abstract_pages.unwrap_or(d.max_abstract_pages).max(1),
            soft_end_min_lines: s.soft_end_min_lines.unwrap_or(d.soft_end_min_lines),
            end_rules,
            title_sample_pages: s.title_sample_pages.unwrap_or(d.title_sample_pages),
            superstring_max_chars: s.superstring_max_chars.unwrap_or(d.superstring_max_chars),
            right_context_max_extra: s
                .right_context_max_extra
                .unwrap_or(d.right_context_max_extra),
            right_context_max_chars: s
                .right_context_max_chars
                .unwrap_or(d.right_context_max_chars),
            chinese_title_min_chars: s
                .chinese_title_min_chars
                .unwrap_or(d.chinese_title_min_chars),
            chinese_title_max_chars: s
                .chinese_title_max_chars
                .unwrap_or(d.chinese_title_max_chars),
            author_narrow_pages: s.author_narrow_pages.unwrap_or(d.author_narrow_pages),
            author_wide_pages: s.author_wide_pages.unwrap_or(d.author_wide_pages),
            author_wide_max_lines: s.author_wide_max_lines.unwrap_or(d.author_wide_max_lines),
            advisor_radius: s.advisor_radius.unwrap_or(d.advisor_radius),
            author_placeholders: self.author_placeholders,
            ..d
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperfields_core::config_file::{AbstractSpanConfig, AuthorConfig};

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.max_abstract_pages, 3);
        assert_eq!(config.soft_end_min_lines, 5);
        assert_eq!(config.right_context_max_extra, 60);
        assert_eq!(config.end_rules().len(), END_REGEXES.len());
    }

    #[test]
    fn test_builder_basic() {
        let config = ExtractionConfigBuilder::new()
            .max_abstract_pages(2)
            .soft_end_min_lines(3)
            .advisor_radius(7)
            .build()
            .unwrap();
        assert_eq!(config.max_abstract_pages, 2);
        assert_eq!(config.soft_end_min_lines, 3);
        assert_eq!(config.advisor_radius, 7);
        assert_eq!(config.superstring_max_chars, 80);
    }

    #[test]
    fn test_builder_zero_pages_clamped() {
        let config = ExtractionConfigBuilder::new()
            .max_abstract_pages(0)
            .build()
            .unwrap();
        assert_eq!(config.max_abstract_pages, 1);
    }

    #[test]
    fn test_builder_extend_end_rules() {
        let config = ExtractionConfigBuilder::new()
            .add_end_pattern("methods_en", r"^\s*Methods\b")
            .build()
            .unwrap();
        let rules = config.end_rules();
        assert_eq!(rules.len(), END_REGEXES.len() + 1);
        assert_eq!(rules.last().unwrap().name, "methods_en");
        assert!(rules.last().unwrap().regex.is_match("METHODS"));
    }

    #[test]
    fn test_builder_replace_end_rules() {
        let config = ExtractionConfigBuilder::new()
            .set_end_patterns(vec![("only".to_string(), r"^END$".to_string())])
            .build()
            .unwrap();
        let rules = config.end_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "only");
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ExtractionConfigBuilder::new()
            .add_end_pattern("broken", r"[invalid")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_author_placeholders_lowercased() {
        let config = ExtractionConfigBuilder::new()
            .add_author_placeholder("Owner".to_string())
            .build()
            .unwrap();
        let placeholders = config.author_placeholders();
        assert!(placeholders.contains(&"admin".to_string()));
        assert!(placeholders.contains(&"owner".to_string()));
    }

    #[test]
    fn test_from_config_file() {
        let file = ConfigFile {
            abstract_span: Some(AbstractSpanConfig {
                max_pages: Some(4),
                extra_end_patterns: Some(vec![r"^\s*Background\b".to_string()]),
                ..Default::default()
            }),
            author: Some(AuthorConfig {
                wide_pages: Some(12),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = ExtractionConfigBuilder::from_config_file(&file).build().unwrap();
        assert_eq!(config.max_abstract_pages, 4);
        assert_eq!(config.author_wide_pages, 12);
        assert_eq!(config.soft_end_min_lines, 5);
        assert_eq!(config.end_rules().last().unwrap().name, "custom_1");
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
