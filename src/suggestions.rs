//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Template configuration not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for a template directory without `rollup.yaml`.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Template configuration not found: {path}\n\n\
         hint: Create a rollup.yaml file in the template root\n\
         hint: Check that TEMPLATE_DIR points at the template, not at the rendered project",
        path = path.display()
    )
}

/// Generate an error for a malformed `KEY=VALUE` argument.
pub fn invalid_key_value(argument: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid context variable: {argument}\n\n\
         hint: Use KEY=VALUE, e.g. --extra-context project_dest=my-project"
    )
}

/// Generate an error for a reference to an unknown name.
///
/// `candidates` are the valid names of the reference's family; a close one
/// becomes a "did you mean" hint.
pub fn unknown_reference(reference: &str, name: &str, family: &str, candidates: &[&str]) -> Error {
    let hint = match find_similar(name, candidates) {
        Some(similar) => format!("Did you mean '{similar}'?"),
        None => format!("Valid {family} are: {}", candidates.join(", ")),
    };
    Error::ConfigParse {
        message: format!("Unknown reference `{reference}`"),
        hint: Some(hint),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
/// Case differences are not counted.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input, &candidate.to_lowercase());
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_len]
}
