//! Per-strategy configuration schemas
//!
//! Every strategy declares the keys it accepts in its `config:` block in
//! `rollup.yaml`. A block is deserialized into a raw struct (serde rejects
//! unknown keys and fills in declared defaults) and then validated into the
//! frozen config the strategy runs with. Regex-valued keys are compiled here,
//! once, so a bad pattern fails the whole rollup before any file is touched.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default pattern for lines that belong to a leading comment header.
pub const DEFAULT_COMMENT_PATTERN: &str = r"^ *([;#%]|//)";

/// Default prefix for generated line comments.
pub const DEFAULT_LINE_COMMENT_START: &str = "#";

/// Default suffix appended to generated lines that are too long.
pub const DEFAULT_LINTER_IGNORE_MARK: &str = "  # noqa";

/// Smallest accepted `max_line_length`.
pub const MIN_MAX_LINE_LENGTH: usize = 10;

/// Config of strategies that take no parameters.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmptyConfig {}

/// Config of `SortedUniqueLines`.
#[derive(Clone, Debug)]
pub struct SortedUniqueLinesConfig {
    /// Lines matching this pattern (or blank lines) at the start of a file
    /// form its header.
    pub comment_pattern: Regex,
}

/// Config of `TemplateHash` and `RenderedTemplateFileHash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateHashConfig {
    /// Prefix that starts a line comment in the target file's language.
    pub line_comment_start: String,
    /// Generated lines longer than this get the linter ignore mark.
    /// `None` disables the check.
    pub max_line_length: Option<usize>,
    /// Suffix appended to generated lines longer than `max_line_length`.
    pub max_line_linter_ignore_mark: String,
}

/// A (section pattern, key pattern) pair.
#[derive(Clone, Debug)]
pub struct SectionKeyPattern {
    pub sections: Regex,
    pub keys: Regex,
}

/// A section pattern with optional keys to leave at the template's value.
#[derive(Clone, Debug)]
pub struct SectionPattern {
    pub sections: Regex,
    pub excluded_keys: Option<Regex>,
}

/// Config of `ConfigParserMerge`.
#[derive(Clone, Debug, Default)]
pub struct ConfigParserMergeConfig {
    pub preserve_keys: Vec<SectionKeyPattern>,
    pub preserve_sections: Vec<SectionPattern>,
}

/// Config of `SetupCfgMerge`.
#[derive(Clone, Debug, Default)]
pub struct SetupCfgMergeConfig {
    pub base: ConfigParserMergeConfig,
    pub merge_requirements: Vec<SectionKeyPattern>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSortedUniqueLinesConfig {
    #[serde(default = "default_comment_pattern")]
    comment_pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTemplateHashConfig {
    #[serde(default = "default_line_comment_start")]
    line_comment_start: String,
    #[serde(default)]
    max_line_length: Option<i64>,
    #[serde(default = "default_linter_ignore_mark")]
    max_line_linter_ignore_mark: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSectionKeyPattern {
    sections: String,
    keys: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSectionPattern {
    sections: String,
    #[serde(default)]
    excluded_keys: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigParserMergeConfig {
    #[serde(default)]
    preserve_keys: Vec<RawSectionKeyPattern>,
    #[serde(default)]
    preserve_sections: Vec<RawSectionPattern>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSetupCfgMergeConfig {
    #[serde(default)]
    preserve_keys: Vec<RawSectionKeyPattern>,
    #[serde(default)]
    preserve_sections: Vec<RawSectionPattern>,
    #[serde(default)]
    merge_requirements: Vec<RawSectionKeyPattern>,
}

fn default_comment_pattern() -> String {
    DEFAULT_COMMENT_PATTERN.to_string()
}

fn default_line_comment_start() -> String {
    DEFAULT_LINE_COMMENT_START.to_string()
}

fn default_linter_ignore_mark() -> String {
    DEFAULT_LINTER_IGNORE_MARK.to_string()
}

/// Deserialize a config block, turning serde's message into a config error
/// that names the strategy.
fn load<T: DeserializeOwned>(strategy: &str, raw: &serde_yaml::Value) -> Result<T> {
    let raw = match raw {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
        other => other.clone(),
    };
    serde_yaml::from_value(raw).map_err(|e| Error::ConfigParse {
        message: format!("Invalid config for strategy {}: {}", strategy, e),
        hint: Some(format!(
            "See the documentation of {} for the accepted config keys",
            strategy
        )),
    })
}

fn compile_pattern(strategy: &str, field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::ConfigParse {
        message: format!(
            "Invalid config for strategy {}: `{}` is not a valid pattern: {}",
            strategy, field, e
        ),
        hint: None,
    })
}

fn compile_section_key_patterns(
    strategy: &str,
    field: &str,
    raw: Vec<RawSectionKeyPattern>,
) -> Result<Vec<SectionKeyPattern>> {
    raw.into_iter()
        .map(|item| {
            Ok(SectionKeyPattern {
                sections: compile_pattern(strategy, &format!("{field}.sections"), &item.sections)?,
                keys: compile_pattern(strategy, &format!("{field}.keys"), &item.keys)?,
            })
        })
        .collect()
}

fn compile_section_patterns(
    strategy: &str,
    raw: Vec<RawSectionPattern>,
) -> Result<Vec<SectionPattern>> {
    raw.into_iter()
        .map(|item| {
            let excluded_keys = item
                .excluded_keys
                .as_deref()
                .map(|p| compile_pattern(strategy, "preserve_sections.excluded_keys", p))
                .transpose()?;
            Ok(SectionPattern {
                sections: compile_pattern(strategy, "preserve_sections.sections", &item.sections)?,
                excluded_keys,
            })
        })
        .collect()
}

/// Validate the config of a strategy without parameters.
pub fn empty_config(strategy: &str, raw: &serde_yaml::Value) -> Result<()> {
    load::<EmptyConfig>(strategy, raw).map(|_| ())
}

impl SortedUniqueLinesConfig {
    pub fn from_yaml(strategy: &str, raw: &serde_yaml::Value) -> Result<Self> {
        let raw: RawSortedUniqueLinesConfig = load(strategy, raw)?;
        Ok(Self {
            comment_pattern: compile_pattern(strategy, "comment_pattern", &raw.comment_pattern)?,
        })
    }
}

impl Default for SortedUniqueLinesConfig {
    fn default() -> Self {
        Self {
            comment_pattern: Regex::new(DEFAULT_COMMENT_PATTERN)
                .expect("default comment pattern is valid"),
        }
    }
}

impl TemplateHashConfig {
    pub fn from_yaml(strategy: &str, raw: &serde_yaml::Value) -> Result<Self> {
        let raw: RawTemplateHashConfig = load(strategy, raw)?;
        let max_line_length = match raw.max_line_length {
            None => None,
            Some(value) if value >= MIN_MAX_LINE_LENGTH as i64 => Some(value as usize),
            Some(value) => {
                return Err(Error::config(format!(
                    "Invalid config for strategy {}: `max_line_length` must be at least {}, got {}",
                    strategy, MIN_MAX_LINE_LENGTH, value
                )))
            }
        };
        Ok(Self {
            line_comment_start: raw.line_comment_start,
            max_line_length,
            max_line_linter_ignore_mark: raw.max_line_linter_ignore_mark,
        })
    }
}

impl Default for TemplateHashConfig {
    fn default() -> Self {
        Self {
            line_comment_start: default_line_comment_start(),
            max_line_length: None,
            max_line_linter_ignore_mark: default_linter_ignore_mark(),
        }
    }
}

impl ConfigParserMergeConfig {
    pub fn from_yaml(strategy: &str, raw: &serde_yaml::Value) -> Result<Self> {
        let raw: RawConfigParserMergeConfig = load(strategy, raw)?;
        Ok(Self {
            preserve_keys: compile_section_key_patterns(strategy, "preserve_keys", raw.preserve_keys)?,
            preserve_sections: compile_section_patterns(strategy, raw.preserve_sections)?,
        })
    }
}

impl SetupCfgMergeConfig {
    pub fn from_yaml(strategy: &str, raw: &serde_yaml::Value) -> Result<Self> {
        let raw: RawSetupCfgMergeConfig = load(strategy, raw)?;
        Ok(Self {
            base: ConfigParserMergeConfig {
                preserve_keys: compile_section_key_patterns(
                    strategy,
                    "preserve_keys",
                    raw.preserve_keys,
                )?,
                preserve_sections: compile_section_patterns(strategy, raw.preserve_sections)?,
            },
            merge_requirements: compile_section_key_patterns(
                strategy,
                "merge_requirements",
                raw.merge_requirements,
            )?,
        })
    }
}

/// Whether `pattern` matches `text` starting at its first character.
pub fn matches_at_start(pattern: &Regex, text: &str) -> bool {
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_empty_config_accepts_null_and_empty_mapping() {
        assert!(empty_config("Overwrite", &serde_yaml::Value::Null).is_ok());
        assert!(empty_config("Overwrite", &yaml("{}")).is_ok());
    }

    #[test]
    fn test_empty_config_rejects_unknown_keys() {
        let err = empty_config("Overwrite", &yaml("some_key: true")).unwrap_err();
        assert!(err.to_string().contains("some_key"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sorted_unique_lines_defaults() {
        let config = SortedUniqueLinesConfig::from_yaml("SortedUniqueLines", &yaml("{}")).unwrap();
        assert_eq!(config.comment_pattern.as_str(), DEFAULT_COMMENT_PATTERN);
    }

    #[test]
    fn test_sorted_unique_lines_rejects_invalid_pattern() {
        let err = SortedUniqueLinesConfig::from_yaml("SortedUniqueLines", &yaml("comment_pattern: '(['"))
            .unwrap_err();
        assert!(err.to_string().contains("comment_pattern"));
    }

    #[test]
    fn test_template_hash_defaults() {
        let config = TemplateHashConfig::from_yaml("TemplateHash", &serde_yaml::Value::Null).unwrap();
        assert_eq!(config, TemplateHashConfig::default());
        assert_eq!(config.max_line_linter_ignore_mark, "  # noqa");
    }

    #[test]
    fn test_template_hash_max_line_length_range() {
        let ok = TemplateHashConfig::from_yaml("TemplateHash", &yaml("max_line_length: 10")).unwrap();
        assert_eq!(ok.max_line_length, Some(10));

        let null = TemplateHashConfig::from_yaml("TemplateHash", &yaml("max_line_length: null")).unwrap();
        assert_eq!(null.max_line_length, None);

        assert!(TemplateHashConfig::from_yaml("TemplateHash", &yaml("max_line_length: 9")).is_err());
        assert!(TemplateHashConfig::from_yaml("TemplateHash", &yaml("max_line_length: -1")).is_err());
    }

    #[test]
    fn test_template_hash_rejects_wrong_type() {
        assert!(TemplateHashConfig::from_yaml("TemplateHash", &yaml("max_line_length: long")).is_err());
    }

    #[test]
    fn test_config_parser_merge_patterns() {
        let config = ConfigParserMergeConfig::from_yaml(
            "ConfigParserMerge",
            &yaml(
                r#"
preserve_keys:
  - sections: ^tool:pytest$
    keys: ^testpaths$
preserve_sections:
  - sections: ^mypy-
  - sections: ^options.extras_require$
    excluded_keys: ^develop$
"#,
            ),
        )
        .unwrap();
        assert_eq!(config.preserve_keys.len(), 1);
        assert_eq!(config.preserve_sections.len(), 2);
        assert!(config.preserve_sections[0].excluded_keys.is_none());
        assert!(config.preserve_sections[1].excluded_keys.is_some());
    }

    #[test]
    fn test_config_parser_merge_rejects_merge_requirements() {
        let err = ConfigParserMergeConfig::from_yaml(
            "ConfigParserMerge",
            &yaml("merge_requirements: [{sections: a, keys: b}]"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("merge_requirements"));
    }

    #[test]
    fn test_setup_cfg_merge_requires_both_patterns() {
        assert!(SetupCfgMergeConfig::from_yaml(
            "SetupCfgMerge",
            &yaml("merge_requirements: [{sections: ^options$}]"),
        )
        .is_err());
    }

    #[test]
    fn test_matches_at_start() {
        let pattern = Regex::new("tox").unwrap();
        assert!(matches_at_start(&pattern, "tox:env"));
        assert!(!matches_at_start(&pattern, "testenv:tox"));
    }
}
