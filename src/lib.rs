//! # Template Rollup Library
//!
//! This library keeps projects generated from a cookiecutter-style template
//! in sync with later versions of that template. It is designed to be used
//! by the `template-rollup` command-line tool but can also be embedded, for
//! example with a different [`renderer::Renderer`].
//!
//! ## Quick Example
//!
//! ```
//! use template_rollup::strategies::{StrategyInput, StrategyKind, StrategyNode};
//! use template_rollup::template::TemplateMeta;
//!
//! let meta = TemplateMeta {
//!     git_project_url: "https://github.com/acme/template".to_string(),
//!     commit_hash: "1".repeat(40),
//!     commit_url: format!("https://github.com/acme/template/commit/{}", "1".repeat(40)),
//!     is_git_dirty: false,
//!     head_ref: Some("master".to_string()),
//! };
//!
//! let node = StrategyNode::with_defaults(StrategyKind::SortedUniqueLines).unwrap();
//! let input = StrategyInput::new(Some(&b"/build\n"[..]), b"*.pyc\n", &meta);
//! assert_eq!(node.apply(input).unwrap(), b"*.pyc\n/build\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The template's `rollup.yaml`, mapping path
//!   patterns to strategies.
//! - **Strategies (`strategies`)**: Pure merge algorithms deciding the new
//!   content of one target file from the rendered template file, the
//!   existing target file and the template's git provenance.
//! - **Cookiecutter contexts (`cookiecutter`)**: The variables a project was
//!   rendered with, stored inside the project itself.
//! - **In-Memory Filesystem (`filesystem`)**: Staging area for rendered and
//!   merged files, so nothing is written until every file merged cleanly.
//! - **Phases (`phases`)**: The rollup pipeline.
//!
//! ## Execution Flow
//!
//! The main entry point is [`phases::execute_rollup`]:
//!
//! 1.  **Configuration**: Load `rollup.yaml` and the template's git metadata.
//! 2.  **Context**: Read the target's cookiecutter context.
//! 3.  **Rendering**: Render the template into a scratch directory.
//! 4.  **Strategies**: Merge every rendered file with its target file.
//! 5.  **Disk Output**: Write the merged files into the target project.

pub mod config;
pub mod cookiecutter;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod gitremotes;
pub mod newline;
pub mod output;
pub mod parsers;
pub mod path;
pub mod phases;
pub mod renderer;
pub mod strategies;
pub mod suggestions;
pub mod template;

#[cfg(test)]
mod path_proptest;
#[cfg(test)]
mod strategies_proptest;
