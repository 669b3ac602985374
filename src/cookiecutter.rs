//! Cookiecutter context readers
//!
//! A rolled-up project records the variables it was rendered with, so the
//! next rollup can render the template again without asking for them. The
//! template decides where that record lives by rendering one of these files:
//!
//! | Reference | File | Location of the variables |
//! |---|---|---|
//! | `cookiecutter.RollupConf` (default) | `.rollup.conf` | `[cookiecutter_context]` section |
//! | `cookiecutter.SetupCfg` | `setup.cfg` | `[tool:cookiecutter_context]` section |
//! | `cookiecutter.YamlContext` | `.rollup-context.yaml` | top-level mapping |
//!
//! For example, a template's `.rollup.conf`:
//!
//! ```ini
//! [cookiecutter_context]
//! {%- for key, value in cookiecutter.items()|sort %}
//! {{ key }} = {{ value }}
//! {%- endfor %}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::parsers::IniDocument;

/// Variable values of a rendered project, keyed by variable name.
pub type CookiecutterContext = BTreeMap<String, String>;

/// Where a project stores its cookiecutter context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContextReaderKind {
    #[default]
    RollupConf,
    SetupCfg,
    YamlContext,
}

impl ContextReaderKind {
    pub const ALL: [ContextReaderKind; 3] = [
        ContextReaderKind::RollupConf,
        ContextReaderKind::SetupCfg,
        ContextReaderKind::YamlContext,
    ];

    /// Name used in `cookiecutter.<Name>` references.
    pub fn name(self) -> &'static str {
        match self {
            ContextReaderKind::RollupConf => "RollupConf",
            ContextReaderKind::SetupCfg => "SetupCfg",
            ContextReaderKind::YamlContext => "YamlContext",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// File name relative to the project root.
    pub fn file_name(self) -> &'static str {
        match self {
            ContextReaderKind::RollupConf => ".rollup.conf",
            ContextReaderKind::SetupCfg => "setup.cfg",
            ContextReaderKind::YamlContext => ".rollup-context.yaml",
        }
    }

    pub fn context_path(self, project_dir: &Path) -> PathBuf {
        project_dir.join(self.file_name())
    }

    /// Read the context stored in `project_dir`.
    ///
    /// Fails with [`Error::ContextNotFound`] when the file does not exist. An
    /// existing file without the context section yields an empty context.
    pub fn read(self, project_dir: &Path) -> Result<CookiecutterContext> {
        let path = self.context_path(project_dir);
        if !path.is_file() {
            return Err(Error::ContextNotFound { path });
        }

        let contents = fs::read(&path)?;
        let context = match self {
            ContextReaderKind::RollupConf => ini_section(&contents, self.file_name(), "cookiecutter_context")?,
            ContextReaderKind::SetupCfg => {
                ini_section(&contents, self.file_name(), "tool:cookiecutter_context")?
            }
            ContextReaderKind::YamlContext => yaml_mapping(&contents, &path)?,
        };

        debug!(
            "Read {} context variable(s) from {}",
            context.len(),
            path.display()
        );
        Ok(context)
    }
}

fn ini_section(contents: &[u8], source_name: &str, section: &str) -> Result<CookiecutterContext> {
    let document = IniDocument::parse_bytes(contents, source_name)?;
    Ok(document.section(section).cloned().unwrap_or_default())
}

fn yaml_mapping(contents: &[u8], path: &Path) -> Result<CookiecutterContext> {
    let value: serde_yaml::Value = serde_yaml::from_slice(contents)?;
    let mapping = match value {
        serde_yaml::Value::Null => return Ok(CookiecutterContext::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => {
            return Err(Error::config(format!(
                "{} must contain a mapping of context variables",
                path.display()
            )))
        }
    };

    mapping
        .into_iter()
        .map(|(key, value)| Ok((scalar_to_string(&key)?, scalar_to_string(&value)?)))
        .collect()
}

/// Scalars become their plain text; sequences and mappings become JSON.
fn scalar_to_string(value: &serde_yaml::Value) -> Result<String> {
    Ok(match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(&tagged.value)?,
        nested => serde_json::to_string(nested)?,
    })
}
