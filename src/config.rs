//! # Template Configuration
//!
//! This module loads `rollup.yaml`, the file in the template root that tells
//! a rollup how to reconcile each file of the rendered template with the
//! target project:
//!
//! ```yaml
//! default_strategy: template_rollup.strategies.Overwrite
//! strategies_mapping:
//!   .gitignore: template_rollup.strategies.SortedUniqueLines
//!   setup.cfg:
//!     strategy: template_rollup.strategies.SetupCfgMerge
//!     config:
//!       merge_requirements:
//!         - sections: ^options$
//!           keys: ^install_requires$
//!   'src/{{ cookiecutter.project_dest }}/__init__.py': template_rollup.strategies.IfMissing
//! git_remote_type: template_rollup.gitremotes.GitLab
//! cookiecutter_context_type: template_rollup.cookiecutter.SetupCfg
//! ```
//!
//! ## Validation
//!
//! Every reference and every `config` block is validated when the file is
//! loaded, so a typo fails the rollup before anything is rendered or
//! written. Path pattern keys keep their placeholders until
//! [`RollupConfig::resolve_strategies`] substitutes them with the project's
//! cookiecutter context.
//!
//! Unknown top-level keys are ignored, as are keys of a strategy node other
//! than `strategy` and `config`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::cookiecutter::{ContextReaderKind, CookiecutterContext};
use crate::error::{Error, Result};
use crate::gitremotes::GitRemoteKind;
use crate::strategies::registry::{
    parse_strategy_node, resolve_context_reader, resolve_git_remote, RollupStrategies,
};
use crate::strategies::StrategyNode;

/// Name of the configuration file in the template root.
pub const CONFIG_FILE_NAME: &str = "rollup.yaml";

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    default_strategy: Option<serde_yaml::Value>,
    #[serde(default)]
    strategies_mapping: Option<serde_yaml::Mapping>,
    #[serde(default)]
    git_remote_type: Option<String>,
    #[serde(default)]
    cookiecutter_context_type: Option<String>,
}

/// Validated contents of `rollup.yaml`.
#[derive(Debug, Clone)]
pub struct RollupConfig {
    /// Strategy for files no pattern matches.
    pub default_strategy: StrategyNode,
    /// Path patterns (placeholders not yet substituted) to strategies.
    pub strategies_mapping: BTreeMap<String, StrategyNode>,
    /// Overrides git remote detection.
    pub git_remote_type: Option<GitRemoteKind>,
    /// Where projects store their cookiecutter context.
    pub cookiecutter_context_type: ContextReaderKind,
}

impl RollupConfig {
    /// Parse and validate `rollup.yaml` contents.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(yaml_content)?;

        let default_strategy = match &raw.default_strategy {
            Some(value) if !value.is_null() => parse_strategy_node(value, "default_strategy")?,
            _ => {
                return Err(Error::ConfigParse {
                    message: format!("`default_strategy` is missing in {}", CONFIG_FILE_NAME),
                    hint: Some(
                        "Add e.g. `default_strategy: template_rollup.strategies.Overwrite`"
                            .to_string(),
                    ),
                })
            }
        };

        let mut strategies_mapping = BTreeMap::new();
        for (key, value) in raw.strategies_mapping.iter().flatten() {
            let pattern = key.as_str().ok_or_else(|| {
                Error::config(format!(
                    "strategies_mapping keys must be strings, got `{}`",
                    serde_yaml::to_string(key).unwrap_or_default().trim()
                ))
            })?;
            let node = parse_strategy_node(value, &format!("strategies_mapping.{}", pattern))?;
            strategies_mapping.insert(pattern.to_string(), node);
        }

        let git_remote_type = raw
            .git_remote_type
            .as_deref()
            .map(resolve_git_remote)
            .transpose()?;

        let cookiecutter_context_type = raw
            .cookiecutter_context_type
            .as_deref()
            .map(resolve_context_reader)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            default_strategy,
            strategies_mapping,
            git_remote_type,
            cookiecutter_context_type,
        })
    }

    /// Parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `rollup.yaml` from a template directory.
    pub fn from_template_dir(template_dir: &Path) -> Result<Self> {
        let path = template_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(Error::ConfigParse {
                message: format!("{} not found in {}", CONFIG_FILE_NAME, template_dir.display()),
                hint: Some("The template root must contain a rollup.yaml file".to_string()),
            });
        }
        Self::from_file(path)
    }

    /// Substitute the context into the pattern keys and build the path
    /// dispatcher.
    pub fn resolve_strategies(&self, context: &CookiecutterContext) -> Result<RollupStrategies> {
        RollupStrategies::new(
            self.default_strategy.clone(),
            &self.strategies_mapping,
            context,
        )
    }
}
