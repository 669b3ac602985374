//! Strategy registry and dispatch
//!
//! Everything `rollup.yaml` names by reference is resolved here. A reference
//! is a dotted name `[template_rollup.]<family>.<Name>`:
//!
//! - `strategies.<Name>` - a built-in strategy, e.g. `strategies.SetupCfgMerge`
//! - `gitremotes.<Name>` - a git remote URL builder
//! - `cookiecutter.<Name>` - a cookiecutter context reader
//!
//! The abstract bases (`strategies.Strategy`, `gitremotes.GitRemote`,
//! `cookiecutter.CookieCutterContext`) exist only as documentation anchors
//! and are rejected.
//!
//! [`RollupStrategies`] maps a project-relative file path to its strategy:
//! the first pattern, in sorted order, that matches the path wins, and the
//! default strategy applies when none does.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{StrategyKind, StrategyNode};
use crate::cookiecutter::ContextReaderKind;
use crate::error::{Error, Result};
use crate::gitremotes::GitRemoteKind;
use crate::path::{compile_glob, substitute_placeholders, PathPattern, Variables};
use crate::suggestions;

/// Optional leading component of every reference.
pub const CRATE_PREFIX: &str = "template_rollup.";

/// A family of referenceable names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Strategies,
    GitRemotes,
    Cookiecutter,
}

impl Family {
    const ALL: [Family; 3] = [Family::Strategies, Family::GitRemotes, Family::Cookiecutter];

    fn module(self) -> &'static str {
        match self {
            Family::Strategies => "strategies",
            Family::GitRemotes => "gitremotes",
            Family::Cookiecutter => "cookiecutter",
        }
    }

    fn abstract_base(self) -> &'static str {
        match self {
            Family::Strategies => "Strategy",
            Family::GitRemotes => "GitRemote",
            Family::Cookiecutter => "CookieCutterContext",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Family::Strategies => "strategies",
            Family::GitRemotes => "git remotes",
            Family::Cookiecutter => "cookiecutter context readers",
        }
    }

    fn names(self) -> Vec<&'static str> {
        match self {
            Family::Strategies => StrategyKind::ALL.iter().map(|k| k.name()).collect(),
            Family::GitRemotes => GitRemoteKind::ALL.iter().map(|k| k.name()).collect(),
            Family::Cookiecutter => ContextReaderKind::ALL.iter().map(|k| k.name()).collect(),
        }
    }
}

/// Resolve `reference` within `family`, returning the implementation name.
fn resolve(reference: &str, family: Family) -> Result<&'static str> {
    let trimmed = reference.trim();
    let qualified = trimmed.strip_prefix(CRATE_PREFIX).unwrap_or(trimmed);

    let Some((module, name)) = qualified.rsplit_once('.') else {
        return Err(Error::ConfigParse {
            message: format!("`{}` is not a dotted reference", reference),
            hint: Some(format!(
                "Use the full name, e.g. `{}{}.{}`",
                CRATE_PREFIX,
                family.module(),
                family.names()[0]
            )),
        });
    };

    if module != family.module() {
        let message = match Family::ALL.iter().find(|other| other.module() == module) {
            Some(other) => format!(
                "`{}` refers to {}, expected one of the {}",
                reference,
                other.description(),
                family.description()
            ),
            None => format!("`{}` does not refer to any known module", reference),
        };
        return Err(Error::ConfigParse {
            message,
            hint: Some(format!(
                "Use `{}{}.<Name>`",
                CRATE_PREFIX,
                family.module()
            )),
        });
    }

    if name == family.abstract_base() {
        return Err(Error::ConfigParse {
            message: format!(
                "`{}` is the abstract base of the {}, not an implementation",
                reference,
                family.description()
            ),
            hint: Some(format!("Valid {} are: {}", family.description(), family.names().join(", "))),
        });
    }

    let names = family.names();
    names
        .iter()
        .copied()
        .find(|candidate| *candidate == name)
        .ok_or_else(|| suggestions::unknown_reference(reference, name, family.description(), &names))
}

/// Resolve a `strategies.<Name>` reference.
pub fn resolve_strategy(reference: &str) -> Result<StrategyKind> {
    let name = resolve(reference, Family::Strategies)?;
    StrategyKind::from_name(name).ok_or_else(|| Error::config(format!("Unknown strategy `{}`", name)))
}

/// Resolve a `gitremotes.<Name>` reference.
pub fn resolve_git_remote(reference: &str) -> Result<GitRemoteKind> {
    let name = resolve(reference, Family::GitRemotes)?;
    GitRemoteKind::from_name(name)
        .ok_or_else(|| Error::config(format!("Unknown git remote `{}`", name)))
}

/// Resolve a `cookiecutter.<Name>` reference.
pub fn resolve_context_reader(reference: &str) -> Result<ContextReaderKind> {
    let name = resolve(reference, Family::Cookiecutter)?;
    ContextReaderKind::from_name(name)
        .ok_or_else(|| Error::config(format!("Unknown cookiecutter context reader `{}`", name)))
}

/// Prefix a configuration error with the place it was found at.
fn at_location(location: &str, error: Error) -> Error {
    match error {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{}: {}", location, message),
            hint,
        },
        other => other,
    }
}

/// Load a strategy node: either a bare reference or a mapping
/// `{strategy: <reference>, config: {...}}`.
///
/// `location` names the node in error messages. Other keys of the mapping
/// are ignored.
pub fn parse_strategy_node(value: &serde_yaml::Value, location: &str) -> Result<StrategyNode> {
    let shape_error = || {
        at_location(
            location,
            Error::ConfigParse {
                message: "expected a strategy reference or a mapping with a `strategy` key"
                    .to_string(),
                hint: Some(
                    "e.g. `template_rollup.strategies.Overwrite` or \
                     `{strategy: template_rollup.strategies.SortedUniqueLines, config: {}}`"
                        .to_string(),
                ),
            },
        )
    };

    let (reference, config) = match value {
        serde_yaml::Value::String(reference) => (reference.as_str(), serde_yaml::Value::Null),
        serde_yaml::Value::Mapping(mapping) => {
            let reference = mapping
                .get("strategy")
                .and_then(serde_yaml::Value::as_str)
                .ok_or_else(shape_error)?;
            let config = match mapping.get("config") {
                None | Some(serde_yaml::Value::Null) => serde_yaml::Value::Null,
                Some(config @ serde_yaml::Value::Mapping(_)) => config.clone(),
                Some(_) => {
                    return Err(at_location(
                        location,
                        Error::config("`config` must be a mapping"),
                    ))
                }
            };
            (reference, config)
        }
        _ => return Err(shape_error()),
    };

    let kind = resolve_strategy(reference).map_err(|e| at_location(location, e))?;
    StrategyNode::new(kind, &config).map_err(|e| at_location(location, e))
}

struct PatternEntry {
    pattern: PathPattern,
    node: StrategyNode,
}

/// Strategies of one rollup, with path patterns resolved against the
/// project's cookiecutter context.
pub struct RollupStrategies {
    default_strategy: StrategyNode,
    strategies_mapping: BTreeMap<String, PatternEntry>,
}

impl RollupStrategies {
    /// Substitute the variables in every pattern key and compile it.
    ///
    /// Two keys that resolve to the same pattern keep the node of the key
    /// that sorts last.
    pub fn new(
        default_strategy: StrategyNode,
        mapping: &BTreeMap<String, StrategyNode>,
        variables: &Variables,
    ) -> Result<Self> {
        let mut strategies_mapping = BTreeMap::new();

        for (raw_pattern, node) in mapping {
            let resolved = substitute_placeholders(raw_pattern, variables)?;
            let entry = PatternEntry {
                pattern: compile_glob(&resolved)?,
                node: node.clone(),
            };
            if raw_pattern != &resolved {
                debug!("Pattern `{}` resolved to `{}`", raw_pattern, resolved);
            }
            if strategies_mapping.insert(resolved.clone(), entry).is_some() {
                warn!(
                    "Pattern `{}` resolves to `{}`, which is already mapped; the later key wins",
                    raw_pattern, resolved
                );
            }
        }

        Ok(Self {
            default_strategy,
            strategies_mapping,
        })
    }

    /// The strategy for a `/`-separated path relative to the project root.
    pub fn get_strategy(&self, path: &str) -> &StrategyNode {
        self.match_pattern(path).1
    }

    /// Like [`get_strategy`](Self::get_strategy), also returning the
    /// matching pattern (`None` for the default strategy).
    pub fn match_pattern(&self, path: &str) -> (Option<&str>, &StrategyNode) {
        self.strategies_mapping
            .iter()
            .find(|(_, entry)| entry.pattern.matches(path))
            .map(|(pattern, entry)| (Some(pattern.as_str()), &entry.node))
            .unwrap_or((None, &self.default_strategy))
    }

    pub fn default_strategy(&self) -> &StrategyNode {
        &self.default_strategy
    }

    /// Resolved patterns in matching order.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &StrategyNode)> {
        self.strategies_mapping
            .iter()
            .map(|(pattern, entry)| (pattern.as_str(), &entry.node))
    }
}
