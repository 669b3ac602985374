//! Line-set merge with a template-owned header
//!
//! Lists such as `.gitignore` or `.dockerignore` get the union of the template
//! and target lines, de-duplicated and sorted. A leading run of comment and
//! blank lines is a header (typically a license notice): the template's header
//! replaces the target's.

use std::collections::BTreeSet;

use regex::Regex;

use super::schema::{matches_at_start, SortedUniqueLinesConfig};
use super::{Strategy, StrategyInput};
use crate::error::Result;
use crate::newline::{detect_newline, split_lines};

const NAME: &str = "SortedUniqueLines";

pub struct SortedUniqueLines<'a> {
    input: StrategyInput<'a>,
    config: &'a SortedUniqueLinesConfig,
}

impl<'a> SortedUniqueLines<'a> {
    pub fn new(input: StrategyInput<'a>, config: &'a SortedUniqueLinesConfig) -> Self {
        Self { input, config }
    }
}

impl Strategy for SortedUniqueLines<'_> {
    fn apply(&self) -> Result<Vec<u8>> {
        let newline = detect_newline(&[self.input.target_contents, Some(self.input.template_contents)]);
        let pattern = &self.config.comment_pattern;

        let (header, template_body) = split_header(pattern, self.input.template_text(NAME)?);
        let mut body: BTreeSet<(String, &str)> = template_body
            .iter()
            .map(|line| (line.to_lowercase(), *line))
            .collect();

        if let Some(target) = self.input.target_text(NAME)? {
            let (_, target_body) = split_header(pattern, target);
            body.extend(target_body.iter().map(|line| (line.to_lowercase(), *line)));
        }

        let mut lines: Vec<&str> = header;
        lines.extend(
            body.iter()
                .map(|(_, line)| *line)
                .filter(|line| !line.is_empty()),
        );
        lines.push("");

        Ok(lines.join(newline).into_bytes())
    }
}

/// Split `text` into its leading comment/blank header and the rest.
fn split_header<'t>(pattern: &Regex, text: &'t str) -> (Vec<&'t str>, Vec<&'t str>) {
    let lines = split_lines(text);
    let body_start = lines
        .iter()
        .position(|line| !(line.trim().is_empty() || matches_at_start(pattern, line)))
        .unwrap_or(lines.len());
    let (header, body) = lines.split_at(body_start);
    (header.to_vec(), body.to_vec())
}
