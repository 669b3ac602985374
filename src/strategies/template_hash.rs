//! Origin-stamped files that are regenerated only when needed
//!
//! Both strategies write the template content followed by a comment block:
//!
//! ```text
//! # Generated by template-rollup
//! # From https://github.com/org/template/commit/1111111111111111111111111111111111111111
//! ```
//!
//! On the next rollup the target is kept untouched when it still contains the
//! "searched" part of that block and the template checkout is clean.
//! `TemplateHash` searches for the whole block, so any new template commit
//! regenerates the file. `RenderedTemplateFileHash` adds a SHA-256 line of
//! the rendered template file and searches only for the lines before `From`,
//! so the file is regenerated only when its rendered content changes.

use sha2::{Digest, Sha256};

use super::schema::TemplateHashConfig;
use super::{Strategy, StrategyInput};
use crate::error::Result;
use crate::newline::{detect_newline, normalize_newlines};

/// First line of every generated comment block.
pub const GENERATED_BY: &str = "Generated by template-rollup";

pub struct TemplateHash<'a> {
    input: StrategyInput<'a>,
    config: &'a TemplateHashConfig,
}

impl<'a> TemplateHash<'a> {
    pub fn new(input: StrategyInput<'a>, config: &'a TemplateHashConfig) -> Self {
        Self { input, config }
    }
}

impl Strategy for TemplateHash<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        let lines = vec![GENERATED_BY.to_string(), from_line(&self.input)];
        let searched = lines.len();
        Ok(stamp(&self.input, self.config, &lines, searched))
    }
}

pub struct RenderedTemplateFileHash<'a> {
    input: StrategyInput<'a>,
    config: &'a TemplateHashConfig,
}

impl<'a> RenderedTemplateFileHash<'a> {
    pub fn new(input: StrategyInput<'a>, config: &'a TemplateHashConfig) -> Self {
        Self { input, config }
    }
}

impl Strategy for RenderedTemplateFileHash<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        let lines = vec![
            GENERATED_BY.to_string(),
            format!(
                "RenderedTemplateFileHash {}",
                content_hash(self.input.template_contents)
            ),
            from_line(&self.input),
        ];
        Ok(stamp(&self.input, self.config, &lines, 2))
    }
}

/// SHA-256 of `contents` as lowercase hex.
pub fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    hex::encode(hasher.finalize())
}

fn from_line(input: &StrategyInput<'_>) -> String {
    let meta = input.template_meta;
    if meta.is_git_dirty {
        format!("From (dirty) {}", meta.commit_url)
    } else {
        format!("From {}", meta.commit_url)
    }
}

/// Render comment lines, one per line, each terminated by `newline`.
fn render_comment(config: &TemplateHashConfig, lines: &[String], newline: &str) -> String {
    let mut out = String::new();
    for line in lines {
        let commented = format!("{} {}", config.line_comment_start, line);
        out.push_str(&commented);
        if let Some(limit) = config.max_line_length {
            if commented.chars().count() > limit {
                out.push_str(&config.max_line_linter_ignore_mark);
            }
        }
        out.push_str(newline);
    }
    out
}

/// Keep the target when it holds the first `searched` comment lines and the
/// template is clean, otherwise regenerate it from the template.
fn stamp(
    input: &StrategyInput<'_>,
    config: &TemplateHashConfig,
    lines: &[String],
    searched: usize,
) -> Vec<u8> {
    let newline = detect_newline(&[input.target_contents, Some(input.template_contents)]);

    if let Some(target) = input.target_contents {
        let needle = render_comment(config, &lines[..searched], newline);
        if !input.template_meta.is_git_dirty && contains(target, needle.as_bytes()) {
            log::debug!("Origin comment found in target, keeping it");
            return target.to_vec();
        }
    }

    let mut out = normalize_newlines(input.template_contents, newline);
    out.extend_from_slice(newline.as_bytes());
    out.extend_from_slice(render_comment(config, lines, newline).as_bytes());
    out
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
