//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `template-rollup` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `template_rollup` library.

pub mod rollup;
pub mod validate;

use anyhow::Result;

use template_rollup::cookiecutter::CookiecutterContext;
use template_rollup::suggestions;

/// Parse repeated `KEY=VALUE` arguments. Later duplicates win.
pub fn parse_key_values(arguments: &[String]) -> Result<CookiecutterContext> {
    let mut context = CookiecutterContext::new();
    for argument in arguments {
        let Some((key, value)) = argument.split_once('=') else {
            return Err(suggestions::invalid_key_value(argument));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(suggestions::invalid_key_value(argument));
        }
        context.insert(key.to_string(), value.to_string());
    }
    Ok(context)
}
