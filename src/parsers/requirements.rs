//! Requirement lists stored inside INI values
//!
//! Values such as `install_requires` hold one dependency specifier per line:
//!
//! ```text
//! install_requires =
//!     requests>=2.0
//!     click[colorama]==8.1
//! ```
//!
//! Entries are identified by their package name, compared case-insensitively
//! and ignoring extras, version specifiers and environment markers.

use std::collections::HashSet;

/// Split a multi-line value into its requirement entries.
///
/// Blank lines and `#` comment lines are dropped; entries are trimmed.
pub fn parse_requirements(value: &str) -> Vec<String> {
    crate::newline::split_lines(value)
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// The package name of a requirement specifier, e.g. `Foo` for
/// `Foo[bar]>=1.0; python_version < "3.8"`.
pub fn requirement_name(requirement: &str) -> &str {
    let trimmed = requirement.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

fn normalized_name(requirement: &str) -> String {
    requirement_name(requirement).to_lowercase()
}

/// Union of two requirement lists.
///
/// Every target entry is kept as written. Template entries are added only
/// when no target entry has the same package name. The result is sorted
/// case-insensitively.
pub fn merge_requirements(template: &[String], target: &[String]) -> Vec<String> {
    let existing: HashSet<String> = target.iter().map(|r| normalized_name(r)).collect();

    let mut merged: Vec<String> = target.to_vec();
    merged.extend(
        template
            .iter()
            .filter(|requirement| !existing.contains(&normalized_name(requirement)))
            .cloned(),
    );

    merged.sort_by_cached_key(|requirement| requirement.to_lowercase());
    merged
}

/// Serialize requirements as a multi-line value with a leading empty line,
/// so that every entry ends up on its own indented line.
pub fn dump_requirements(requirements: &[String]) -> String {
    std::iter::once("")
        .chain(requirements.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reqs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_requirements_skips_blanks_and_comments() {
        let parsed = parse_requirements("\nfoo==1.0\n\n  # pinned\n  bar>=2\n");
        assert_eq!(parsed, reqs(&["foo==1.0", "bar>=2"]));
    }

    #[test]
    fn test_requirement_name() {
        assert_eq!(requirement_name("foo==1.0"), "foo");
        assert_eq!(requirement_name("Foo_Bar[extra]>=1"), "Foo_Bar");
        assert_eq!(requirement_name("zope.interface ; python_version<'3'"), "zope.interface");
        assert_eq!(requirement_name("  pkg-name"), "pkg-name");
    }

    #[test]
    fn test_merge_keeps_target_specifier() {
        let merged = merge_requirements(&reqs(&["foo==1.0"]), &reqs(&["FOO==2.0", "bar==1.0"]));
        assert_eq!(merged, reqs(&["bar==1.0", "FOO==2.0"]));
    }

    #[test]
    fn test_merge_appends_template_only_entries() {
        let merged = merge_requirements(&reqs(&["zeta", "Alpha>=1"]), &reqs(&["beta"]));
        assert_eq!(merged, reqs(&["Alpha>=1", "beta", "zeta"]));
    }

    #[test]
    fn test_merge_without_target() {
        let merged = merge_requirements(&reqs(&["b", "a"]), &[]);
        assert_eq!(merged, reqs(&["a", "b"]));
    }

    #[test]
    fn test_dump_requirements() {
        assert_eq!(dump_requirements(&reqs(&["a", "b"])), "\na\nb");
        assert_eq!(dump_requirements(&[]), "");
    }
}
