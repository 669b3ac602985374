//! # Error Handling
//!
//! This module defines the centralized error type for `template-rollup`. It
//! uses the `thiserror` library to build a single `Error` enum covering every
//! failure mode of a rollup, with enough context in each variant to tell the
//! user which file, reference or template caused the problem.
//!
//! The variants follow the failure classes of a rollup:
//!
//! - **Configuration errors** (`ConfigParse`, `Template`, `Regex`):
//!   bad strategy references, unknown or invalid strategy config keys and
//!   unresolvable placeholders in path patterns. These are raised before any
//!   file is written.
//! - **Template-integrity errors** (`InvalidTemplate`): the rendered template
//!   is missing its cookiecutter context or has an unexpected layout.
//! - **Parse errors** (`IniParse`, `Strategy`): a template or target buffer
//!   could not be parsed by a merge strategy. The source name tells which
//!   buffer failed.
//! - **Collaborator errors** (`GitCommand`, `Filesystem`, `Io`): failures of
//!   git or of the host filesystem.
//!
//! None of these errors are retried: the rollup aborts and can be re-run once
//! the problem is fixed.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for template-rollup operations
#[derive(Error, Debug)]
pub enum Error {
    /// The `rollup.yaml` configuration, a strategy reference or a strategy
    /// config block is invalid.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A placeholder could not be substituted.
    ///
    /// Includes the name of the unknown variable when applicable.
    #[error("Template variable error: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The placeholder variable that caused the error, if applicable
        variable: Option<String>,
    },

    /// The rendered template is malformed.
    #[error("Invalid template: {message}")]
    InvalidTemplate { message: String },

    /// The cookiecutter context file does not exist.
    #[error("Cookiecutter context file not found: {}", path.display())]
    ContextNotFound { path: PathBuf },

    /// An INI document could not be parsed.
    #[error("INI parse error in {source_name} at line {line}: {message}")]
    IniParse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// A strategy could not process its inputs.
    #[error("Strategy {strategy} failed: {message}")]
    Strategy { strategy: String, message: String },

    /// A git command failed in the template directory.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// An error occurred while staging or writing files.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Shorthand for a `ConfigParse` error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            hint: None,
        }
    }

    /// Whether this error belongs to the configuration class, i.e. it was
    /// caused by `rollup.yaml` or by a strategy config block.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigParse { .. } | Error::Template { .. } | Error::Regex(_)
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
