//! Path utilities for template-rollup
//!
//! Path pattern keys in `rollup.yaml` may embed cookiecutter variables
//! (`src/{{ cookiecutter.package }}/__init__.py`). They are substituted
//! against the project's context, then compiled into shell-style glob
//! patterns.
//!
//! Globs follow `fnmatch` rules: `*`, `?`, `[...]` and `[!...]` are the only
//! special syntax and `/` is an ordinary character. A `**` is just two stars,
//! so `docs/**.md` matches `docs/a.md` and `a/**/b` does not match `a/b`.

use std::fmt;
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Variables available for substitution.
pub type Variables = std::collections::BTreeMap<String, String>;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder regex is valid"))
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"))
}

/// Replace `{{ name }}` and `{{ cookiecutter.name }}` placeholders in `text`.
///
/// Any other expression between `{{` and `}}`, and any variable missing from
/// `variables`, is an error.
pub fn substitute_placeholders(text: &str, variables: &Variables) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for captures in placeholder_regex().captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let expression = inner.as_str().trim();
        let name = expression
            .strip_prefix("cookiecutter.")
            .unwrap_or(expression);

        if !identifier_regex().is_match(name) {
            return Err(Error::Template {
                message: format!("Unsupported expression `{}` in `{}`", whole.as_str(), text),
                variable: None,
            });
        }

        let value = variables.get(name).ok_or_else(|| Error::Template {
            message: format!("Undefined variable in `{}`", text),
            variable: Some(name.to_string()),
        })?;

        out.push_str(&text[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Whether `text` contains a placeholder.
pub fn has_placeholders(text: &str) -> bool {
    placeholder_regex().is_match(text)
}

/// A compiled shell-style glob matching the whole of a `/`-separated path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&translate_glob(pattern)).map_err(|e| Error::ConfigParse {
            message: format!("Invalid path pattern `{}`: {}", pattern, e),
            hint: Some("Use *, ? and [...] like in shell globs".to_string()),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Compile a shell-style glob pattern.
///
/// `*`, `?` and `[...]` may match `/`, so `*.txt` matches `docs/a.txt`.
pub fn compile_glob(pattern: &str) -> Result<PathPattern> {
    PathPattern::new(pattern)
}

/// Translate a glob into an anchored regex.
///
/// A `[` without a closing `]` is a literal bracket.
fn translate_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                } else {
                    out.push_str(&translate_class(&chars[i..j]));
                    i = j + 1;
                }
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(r"\z");
    out
}

/// Body of a `[...]` class, without the brackets.
fn translate_class(members: &[char]) -> String {
    let (negated, members) = match members.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, members),
    };

    let mut class = String::from(if negated { "[^" } else { "[" });
    let mut after_range = false;
    for (index, &c) in members.iter().enumerate() {
        let is_range = c == '-' && index > 0 && index + 1 < members.len() && !after_range;
        if is_range {
            class.push('-');
        } else {
            class.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
        after_range = is_range;
    }
    class.push(']');
    class
}

/// Match a path against a glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    Ok(compile_glob(pattern)?.matches(path))
}

/// A relative path as a `/`-separated string.
///
/// Returns `None` for paths that leave their root (`..`) or are absolute.
pub fn relative_path_string(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}
