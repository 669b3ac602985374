//! INI merge strategies
//!
//! The output is the template document, normalized by the pretty printer,
//! with selected parts of the target carried over:
//!
//! - `preserve_sections`: every target section whose name matches replaces
//!   the template's section of the same name. Keys matching `excluded_keys`
//!   keep the template's value.
//! - `preserve_keys`: every matching (section, key) of the target overrides
//!   the template's value, creating the section if needed.
//!
//! `SetupCfgMerge` additionally merges requirement lists (`merge_requirements`)
//! before the preserve rules run, so an excluded key of a preserved section
//! still gets the merged list.

use log::debug;

use super::schema::{
    matches_at_start, ConfigParserMergeConfig, SectionKeyPattern, SetupCfgMergeConfig,
};
use super::{Strategy, StrategyInput};
use crate::error::Result;
use crate::newline::detect_newline;
use crate::parsers::requirements::{dump_requirements, merge_requirements, parse_requirements};
use crate::parsers::IniDocument;

/// Source name of the template buffer in parse errors.
pub const TEMPLATE_SOURCE: &str = "template";
/// Source name of the target buffer in parse errors.
pub const TARGET_SOURCE: &str = "target";

pub struct ConfigParserMerge<'a> {
    input: StrategyInput<'a>,
    config: &'a ConfigParserMergeConfig,
}

impl<'a> ConfigParserMerge<'a> {
    pub fn new(input: StrategyInput<'a>, config: &'a ConfigParserMergeConfig) -> Self {
        Self { input, config }
    }
}

impl Strategy for ConfigParserMerge<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        let (mut out, target) = parse_inputs(&self.input)?;
        preserve(&mut out, &target, self.config);
        Ok(render(&self.input, &out))
    }
}

pub struct SetupCfgMerge<'a> {
    input: StrategyInput<'a>,
    config: &'a SetupCfgMergeConfig,
}

impl<'a> SetupCfgMerge<'a> {
    pub fn new(input: StrategyInput<'a>, config: &'a SetupCfgMergeConfig) -> Self {
        Self { input, config }
    }
}

impl Strategy for SetupCfgMerge<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        let (mut out, target) = parse_inputs(&self.input)?;
        merge_requirement_values(&mut out, &target, &self.config.merge_requirements);
        preserve(&mut out, &target, &self.config.base);
        Ok(render(&self.input, &out))
    }
}

/// Parse the template and the target. A missing target is an empty document.
fn parse_inputs(input: &StrategyInput<'_>) -> Result<(IniDocument, IniDocument)> {
    let template = IniDocument::parse_bytes(input.template_contents, TEMPLATE_SOURCE)?;
    let target = match input.target_contents {
        Some(contents) => IniDocument::parse_bytes(contents, TARGET_SOURCE)?,
        None => IniDocument::new(),
    };
    Ok((template, target))
}

fn render(input: &StrategyInput<'_>, out: &IniDocument) -> Vec<u8> {
    let newline = detect_newline(&[input.target_contents, Some(input.template_contents)]);
    out.to_pretty_string(newline).into_bytes()
}

fn preserve(out: &mut IniDocument, target: &IniDocument, config: &ConfigParserMergeConfig) {
    for rule in &config.preserve_sections {
        for section in target.section_names() {
            if !matches_at_start(&rule.sections, section) {
                continue;
            }
            let Some(entries) = target.section(section) else {
                continue;
            };

            let mut preserved = entries.clone();
            if let (Some(excluded), Some(current)) = (&rule.excluded_keys, out.section(section)) {
                for (key, value) in current {
                    if matches_at_start(excluded, key) {
                        preserved.insert(key.clone(), value.clone());
                    }
                }
            }

            debug!("Preserving section [{}] from target", section);
            out.replace_section(section, preserved);
        }
    }

    for rule in &config.preserve_keys {
        for section in target.section_names() {
            if !matches_at_start(&rule.sections, section) {
                continue;
            }
            let Some(entries) = target.section(section) else {
                continue;
            };
            for (key, value) in entries {
                if matches_at_start(&rule.keys, key) {
                    debug!("Preserving [{}] {} from target", section, key);
                    out.set(section, key, value.clone());
                }
            }
        }
    }
}

/// Merge every requirement list matched by `rules`, looking at (section, key)
/// pairs of both documents.
fn merge_requirement_values(
    out: &mut IniDocument,
    target: &IniDocument,
    rules: &[SectionKeyPattern],
) {
    let mut matched: Vec<(String, String)> = Vec::new();
    for doc in [&*out, target] {
        for section in doc.section_names() {
            let Some(entries) = doc.section(section) else {
                continue;
            };
            for key in entries.keys() {
                let wanted = rules.iter().any(|rule| {
                    matches_at_start(&rule.sections, section) && matches_at_start(&rule.keys, key)
                });
                if wanted {
                    matched.push((section.to_string(), key.clone()));
                }
            }
        }
    }
    matched.sort();
    matched.dedup();

    for (section, key) in matched {
        let template_requirements = parse_requirements(out.get(&section, &key).unwrap_or(""));
        let target_requirements = parse_requirements(target.get(&section, &key).unwrap_or(""));
        let merged = merge_requirements(&template_requirements, &target_requirements);
        debug!(
            "Merged [{}] {}: {} requirement(s)",
            section,
            key,
            merged.len()
        );
        out.set(&section, &key, dump_requirements(&merged));
    }
}
