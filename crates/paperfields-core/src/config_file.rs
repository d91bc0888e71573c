use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "abstract")]
    pub abstract_span: Option<AbstractSpanConfig>,
    pub title: Option<TitleConfig>,
    pub author: Option<AuthorConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbstractSpanConfig {
    pub max_pages: Option<usize>,
    pub soft_end_min_lines: Option<usize>,
    /// Extra end-of-abstract regexes, appended after the built-in rules.
    pub extra_end_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleConfig {
    pub sample_pages: Option<usize>,
    pub superstring_max_chars: Option<usize>,
    pub right_context_max_extra: Option<usize>,
    pub right_context_max_chars: Option<usize>,
    pub chinese_min_chars: Option<usize>,
    pub chinese_max_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorConfig {
    pub narrow_pages: Option<usize>,
    pub wide_pages: Option<usize>,
    pub wide_max_lines: Option<usize>,
    pub advisor_radius: Option<usize>,
    /// Extra placeholder author names, appended to the built-in set.
    pub extra_placeholders: Option<Vec<String>>,
}

/// Platform config directory path: `<config_dir>/paperfields/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperfields").join("config.toml"))
}

/// Load config by cascading CWD `.paperfields.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperfields.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn pick<T: Clone, S>(overlay: Option<&S>, base: Option<&S>, get: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&get).or_else(|| base.and_then(&get))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (ba, oa) = (base.abstract_span.as_ref(), overlay.abstract_span.as_ref());
    let (bt, ot) = (base.title.as_ref(), overlay.title.as_ref());
    let (bu, ou) = (base.author.as_ref(), overlay.author.as_ref());

    ConfigFile {
        abstract_span: Some(AbstractSpanConfig {
            max_pages: pick(oa, ba, |a| a.max_pages),
            soft_end_min_lines: pick(oa, ba, |a| a.soft_end_min_lines),
            extra_end_patterns: pick(oa, ba, |a| a.extra_end_patterns.clone()),
        }),
        title: Some(TitleConfig {
            sample_pages: pick(ot, bt, |t| t.sample_pages),
            superstring_max_chars: pick(ot, bt, |t| t.superstring_max_chars),
            right_context_max_extra: pick(ot, bt, |t| t.right_context_max_extra),
            right_context_max_chars: pick(ot, bt, |t| t.right_context_max_chars),
            chinese_min_chars: pick(ot, bt, |t| t.chinese_min_chars),
            chinese_max_chars: pick(ot, bt, |t| t.chinese_max_chars),
        }),
        author: Some(AuthorConfig {
            narrow_pages: pick(ou, bu, |a| a.narrow_pages),
            wide_pages: pick(ou, bu, |a| a.wide_pages),
            wide_max_lines: pick(ou, bu, |a| a.wide_max_lines),
            advisor_radius: pick(ou, bu, |a| a.advisor_radius),
            extra_placeholders: pick(ou, bu, |a| a.extra_placeholders.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstract_table_round_trip_toml() {
        let config = ConfigFile {
            abstract_span: Some(AbstractSpanConfig {
                max_pages: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[abstract]"));
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.abstract_span.unwrap().max_pages, Some(2));
    }

    #[test]
    fn absent_tables_deserialize_as_none() {
        let parsed: ConfigFile = toml::from_str("[author]\nwide_pages = 10\n").unwrap();
        assert!(parsed.abstract_span.is_none());
        assert_eq!(parsed.author.unwrap().wide_pages, Some(10));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            author: Some(AuthorConfig {
                wide_pages: Some(6),
                advisor_radius: Some(4),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            author: Some(AuthorConfig {
                wide_pages: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).author.unwrap();
        assert_eq!(merged.wide_pages, Some(10));
        assert_eq!(merged.advisor_radius, Some(4));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[title]\nchinese_max_chars = 50\n").unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.title.unwrap().chinese_max_chars, Some(50));
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}
