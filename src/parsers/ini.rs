//! INI document parsing and pretty-printing
//!
//! This module reads the INI dialect used by Python-style `setup.cfg`,
//! `tox.ini` and `.pylintrc` files and writes it back in a deterministic,
//! normalized form.
//!
//! ## Dialect
//!
//! - Section headers: `[section_name]`
//! - Key-value pairs: `key = value` or `key: value`
//! - Full-line comments starting with `#` or `;`
//! - Multi-line values: lines indented deeper than their key continue the
//!   previous value
//! - Option names are lower-cased
//! - Duplicate sections or options, and options before the first section
//!   header, are parse errors
//! - `DEFAULT` is an ordinary section: its keys are not inherited elsewhere
//! - No value interpolation
//!
//! ## Pretty output
//!
//! [`IniDocument::to_pretty_string`] sorts sections and keys, writes
//! `key = value` with continuation lines indented by 4 spaces, expands tabs,
//! strips trailing whitespace and separates sections with one blank line.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::newline::split_lines;

/// Key-value entries of one section, sorted by key.
pub type IniSection = BTreeMap<String, String>;

/// A parsed INI document.
///
/// Sections and keys live in sorted maps, so iteration order is always the
/// order of the pretty-printed output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, IniSection>,
}

/// An option whose value may still receive continuation lines.
struct OpenOption {
    section: String,
    key: String,
    indent: usize,
}

impl IniDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw byte buffer. `source_name` identifies the buffer in errors.
    pub fn parse_bytes(content: &[u8], source_name: &str) -> Result<Self> {
        let text = std::str::from_utf8(content).map_err(|e| Error::IniParse {
            source_name: source_name.to_string(),
            line: 0,
            message: format!("content is not valid UTF-8: {}", e),
        })?;
        Self::parse(text, source_name)
    }

    /// Parse INI text. `source_name` identifies the buffer in errors.
    pub fn parse(content: &str, source_name: &str) -> Result<Self> {
        let parse_error = |line: usize, message: String| Error::IniParse {
            source_name: source_name.to_string(),
            line,
            message,
        };

        let mut values: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        let mut current_section: Option<String> = None;
        let mut open_option: Option<OpenOption> = None;

        for (index, line) in split_lines(content).into_iter().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if trimmed.is_empty() {
                if let Some(open) = &open_option {
                    push_value_line(&mut values, open, String::new());
                }
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            if let Some(open) = &open_option {
                if indent > open.indent {
                    push_value_line(&mut values, open, trimmed.to_string());
                    continue;
                }
            }

            if let Some(name) = section_header(trimmed) {
                if values.contains_key(name) {
                    return Err(parse_error(
                        line_number,
                        format!("section `{}` already exists", name),
                    ));
                }
                values.insert(name.to_string(), BTreeMap::new());
                current_section = Some(name.to_string());
                open_option = None;
                continue;
            }

            let section = current_section.clone().ok_or_else(|| {
                parse_error(
                    line_number,
                    format!("`{}` appears before any section header", trimmed),
                )
            })?;

            let delimiter = trimmed.find(['=', ':']).ok_or_else(|| {
                parse_error(
                    line_number,
                    format!("expected `key = value`, got `{}`", trimmed),
                )
            })?;

            let key = trimmed[..delimiter].trim().to_lowercase();
            if key.is_empty() {
                return Err(parse_error(line_number, "empty option name".to_string()));
            }
            let value = trimmed[delimiter + 1..].trim().to_string();

            let entries = values.entry(section.clone()).or_default();
            if entries.contains_key(&key) {
                return Err(parse_error(
                    line_number,
                    format!("option `{}` in section `{}` already exists", key, section),
                ));
            }
            entries.insert(key.clone(), vec![value]);
            open_option = Some(OpenOption {
                section,
                key,
                indent,
            });
        }

        let sections = values
            .into_iter()
            .map(|(name, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(key, lines)| (key, lines.join("\n").trim_end().to_string()))
                    .collect();
                (name, entries)
            })
            .collect();

        Ok(Self { sections })
    }

    /// Names of all sections in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Get a section by name.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    /// Get a single value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Set a single value, creating the section if it doesn't exist.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ensure_section(section)
            .insert(key.to_lowercase(), value.into());
    }

    /// Get a section, creating it empty if it doesn't exist.
    pub fn ensure_section(&mut self, name: &str) -> &mut IniSection {
        self.sections.entry(name.to_string()).or_default()
    }

    /// Replace a section's entries wholesale.
    pub fn replace_section(&mut self, name: &str, entries: IniSection) {
        self.sections.insert(name.to_string(), entries);
    }

    /// Whether the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Serialize with sorted sections and keys, joined by `newline`.
    pub fn to_pretty_string(&self, newline: &str) -> String {
        let mut raw = String::new();

        for (name, entries) in &self.sections {
            raw.push('[');
            raw.push_str(name);
            raw.push_str("]\n");

            for (key, value) in entries {
                raw.push_str(key);
                raw.push_str(" = ");
                raw.push_str(&value.replace('\n', "\n\t"));
                raw.push('\n');
            }

            raw.push('\n');
        }

        split_lines(&raw)
            .into_iter()
            .map(|line| expand_tabs(line, 4).trim_end().to_string())
            .collect::<Vec<_>>()
            .join(newline)
    }
}

fn push_value_line(
    values: &mut BTreeMap<String, BTreeMap<String, Vec<String>>>,
    open: &OpenOption,
    line: String,
) {
    if let Some(lines) = values
        .get_mut(&open.section)
        .and_then(|entries| entries.get_mut(&open.key))
    {
        lines.push(line);
    }
}

/// Extract the name from a `[name]` header line.
///
/// The name runs up to the last `]` of the line and must not be empty.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.rfind(']')?;
    let name = &rest[..end];
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Replace tabs with spaces up to the next multiple of `tab_size` columns.
fn expand_tabs(line: &str, tab_size: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;

    for ch in line.chars() {
        if ch == '\t' {
            let spaces = tab_size - column % tab_size;
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(ch);
            column += 1;
        }
    }

    out
}
