//! Strategy engine
//!
//! A strategy decides the new content of one target file from the rendered
//! template file, the existing target file (if any) and the template's git
//! provenance. Strategies are pure: they see byte buffers only and never touch
//! the filesystem, so every one of them can be tested with literal inputs.
//!
//! ## Built-in strategies
//!
//! - `Overwrite` (simple.rs) - always the template content
//! - `IfMissing` (simple.rs) - the target content when it exists
//! - `SortedUniqueLines` (sorted_unique_lines.rs) - union of lines, sorted
//! - `TemplateHash`, `RenderedTemplateFileHash` (template_hash.rs) -
//!   template content stamped with its origin, kept stable between rollups
//! - `ConfigParserMerge`, `SetupCfgMerge` (config_parser_merge.rs) - INI
//!   documents rebuilt from the template with selected target values kept
//!
//! A strategy is referenced from `rollup.yaml` by name (see [`registry`]) and
//! carries a validated config (see [`schema`]).

pub mod config_parser_merge;
pub mod registry;
pub mod schema;
pub mod simple;
pub mod sorted_unique_lines;
pub mod template_hash;

use std::fmt;

use crate::error::{Error, Result};
use crate::template::TemplateMeta;

pub use config_parser_merge::{ConfigParserMerge, SetupCfgMerge};
pub use registry::RollupStrategies;
pub use schema::{
    ConfigParserMergeConfig, SetupCfgMergeConfig, SortedUniqueLinesConfig, TemplateHashConfig,
};
pub use simple::{IfMissing, Overwrite};
pub use sorted_unique_lines::SortedUniqueLines;
pub use template_hash::{RenderedTemplateFileHash, TemplateHash};

/// The inputs of one strategy run.
#[derive(Clone, Copy, Debug)]
pub struct StrategyInput<'a> {
    /// Current content of the target file, `None` if it does not exist.
    pub target_contents: Option<&'a [u8]>,
    /// Content of the rendered template file.
    pub template_contents: &'a [u8],
    /// Provenance of the template checkout.
    pub template_meta: &'a TemplateMeta,
}

impl<'a> StrategyInput<'a> {
    pub fn new(
        target_contents: Option<&'a [u8]>,
        template_contents: &'a [u8],
        template_meta: &'a TemplateMeta,
    ) -> Self {
        Self {
            target_contents,
            template_contents,
            template_meta,
        }
    }

    /// Template content as text.
    pub(crate) fn template_text(&self, strategy: &str) -> Result<&'a str> {
        decode(strategy, "template", self.template_contents)
    }

    /// Target content as text, if the target exists.
    pub(crate) fn target_text(&self, strategy: &str) -> Result<Option<&'a str>> {
        self.target_contents
            .map(|contents| decode(strategy, "target", contents))
            .transpose()
    }
}

fn decode<'a>(strategy: &str, source: &str, contents: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(contents).map_err(|e| Error::Strategy {
        strategy: strategy.to_string(),
        message: format!("{} is not valid UTF-8: {}", source, e),
    })
}

/// A merge algorithm bound to its inputs and config.
pub trait Strategy {
    /// Compute the new content of the target file.
    fn apply(&self) -> Result<Vec<u8>>;
}

/// Names of the built-in strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Overwrite,
    IfMissing,
    SortedUniqueLines,
    TemplateHash,
    RenderedTemplateFileHash,
    ConfigParserMerge,
    SetupCfgMerge,
}

impl StrategyKind {
    /// Every built-in strategy, in documentation order.
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Overwrite,
        StrategyKind::IfMissing,
        StrategyKind::SortedUniqueLines,
        StrategyKind::TemplateHash,
        StrategyKind::RenderedTemplateFileHash,
        StrategyKind::ConfigParserMerge,
        StrategyKind::SetupCfgMerge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Overwrite => "Overwrite",
            StrategyKind::IfMissing => "IfMissing",
            StrategyKind::SortedUniqueLines => "SortedUniqueLines",
            StrategyKind::TemplateHash => "TemplateHash",
            StrategyKind::RenderedTemplateFileHash => "RenderedTemplateFileHash",
            StrategyKind::ConfigParserMerge => "ConfigParserMerge",
            StrategyKind::SetupCfgMerge => "SetupCfgMerge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated config of a strategy.
#[derive(Clone, Debug)]
pub enum StrategyConfig {
    Empty,
    SortedUniqueLines(SortedUniqueLinesConfig),
    TemplateHash(TemplateHashConfig),
    ConfigParserMerge(ConfigParserMergeConfig),
    SetupCfgMerge(SetupCfgMergeConfig),
}

/// A strategy together with its validated config.
///
/// The config is frozen once the node is built; running the strategy
/// borrows it.
#[derive(Clone, Debug)]
pub struct StrategyNode {
    kind: StrategyKind,
    config: StrategyConfig,
}

impl StrategyNode {
    /// Validate `raw_config` against the schema of `kind`.
    ///
    /// `Null` stands for an omitted config block.
    pub fn new(kind: StrategyKind, raw_config: &serde_yaml::Value) -> Result<Self> {
        let name = kind.name();
        let config = match kind {
            StrategyKind::Overwrite | StrategyKind::IfMissing => {
                schema::empty_config(name, raw_config)?;
                StrategyConfig::Empty
            }
            StrategyKind::SortedUniqueLines => StrategyConfig::SortedUniqueLines(
                SortedUniqueLinesConfig::from_yaml(name, raw_config)?,
            ),
            StrategyKind::TemplateHash | StrategyKind::RenderedTemplateFileHash => {
                StrategyConfig::TemplateHash(TemplateHashConfig::from_yaml(name, raw_config)?)
            }
            StrategyKind::ConfigParserMerge => StrategyConfig::ConfigParserMerge(
                ConfigParserMergeConfig::from_yaml(name, raw_config)?,
            ),
            StrategyKind::SetupCfgMerge => {
                StrategyConfig::SetupCfgMerge(SetupCfgMergeConfig::from_yaml(name, raw_config)?)
            }
        };
        Ok(Self { kind, config })
    }

    /// A node with the default config of `kind`.
    pub fn with_defaults(kind: StrategyKind) -> Result<Self> {
        Self::new(kind, &serde_yaml::Value::Null)
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Bind the strategy to its inputs.
    pub fn instantiate<'a>(&'a self, input: StrategyInput<'a>) -> Box<dyn Strategy + 'a> {
        match (&self.config, self.kind) {
            (StrategyConfig::SortedUniqueLines(config), _) => {
                Box::new(SortedUniqueLines::new(input, config))
            }
            (StrategyConfig::TemplateHash(config), StrategyKind::RenderedTemplateFileHash) => {
                Box::new(RenderedTemplateFileHash::new(input, config))
            }
            (StrategyConfig::TemplateHash(config), _) => Box::new(TemplateHash::new(input, config)),
            (StrategyConfig::ConfigParserMerge(config), _) => {
                Box::new(ConfigParserMerge::new(input, config))
            }
            (StrategyConfig::SetupCfgMerge(config), _) => {
                Box::new(SetupCfgMerge::new(input, config))
            }
            (StrategyConfig::Empty, StrategyKind::IfMissing) => Box::new(IfMissing::new(input)),
            (StrategyConfig::Empty, _) => Box::new(Overwrite::new(input)),
        }
    }

    /// Run the strategy on `input`.
    pub fn apply(&self, input: StrategyInput<'_>) -> Result<Vec<u8>> {
        self.instantiate(input).apply()
    }
}
