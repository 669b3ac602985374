//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a template's
//! `rollup.yaml` without rendering or writing anything.
//!
//! ## Functionality
//!
//! - **Configuration Validation**: Parses `rollup.yaml` and validates every
//!   strategy reference and config block.
//! - **Pattern Resolution**: Substitutes the context into every pattern key
//!   and compiles the resulting globs. The context is the template's
//!   `cookiecutter.json` defaults, overridden by `--context KEY=VALUE`.
//!
//! The resolved mapping is printed in matching order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use template_rollup::config::{RollupConfig, CONFIG_FILE_NAME};
use template_rollup::output::{emoji, OutputConfig};
use template_rollup::renderer::template_variables;
use template_rollup::suggestions;

use super::parse_key_values;

/// Validate a template's rollup.yaml
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Template directory containing rollup.yaml
    #[arg(value_name = "TEMPLATE_DIR")]
    pub template_dir: PathBuf,

    /// Context variable used to resolve pattern keys (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = args.template_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Err(suggestions::config_not_found(&config_path));
    }

    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );

    let config = match RollupConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            println!(
                "{} Configuration parsing failed",
                emoji(&out, "❌", "[ERR]")
            );
            return Err(e.into());
        }
    };
    println!(
        "{} Configuration file parsed successfully",
        emoji(&out, "✅", "[OK]")
    );

    let overrides = parse_key_values(&args.context)?;
    let context = template_variables(&args.template_dir, &overrides)?;
    let strategies = config.resolve_strategies(&context)?;

    println!("\n{} Resolved strategies:", emoji(&out, "📊", "[INFO]"));
    for (pattern, node) in strategies.patterns() {
        println!("   {} -> {}", pattern, node.kind());
    }
    println!("   <default> -> {}", strategies.default_strategy().kind());

    println!(
        "\n   Context reader: {}",
        config.cookiecutter_context_type.name()
    );
    println!(
        "   Git remote: {}",
        config
            .git_remote_type
            .map(|kind| kind.name())
            .unwrap_or("auto-detect")
    );

    println!("\n{} Configuration is valid", emoji(&out, "✅", "[OK]"));
    Ok(())
}
