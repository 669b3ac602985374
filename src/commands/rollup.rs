//! Rollup command implementation
//!
//! The rollup command renders the template for the target project and merges
//! every rendered file into it:
//! 1. Load rollup.yaml and the template's git metadata
//! 2. Read the project's stored cookiecutter context
//! 3. Render the template
//! 4. Apply the configured strategy to every file
//! 5. Write the result (unless `--dry-run`)

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use template_rollup::config::CONFIG_FILE_NAME;
use template_rollup::output::{emoji, format_file_line, format_summary, OutputConfig};
use template_rollup::phases::{execute_rollup, RollupOptions};
use template_rollup::renderer::PlaceholderRenderer;
use template_rollup::suggestions;

use super::parse_key_values;

/// Arguments for the rollup command
#[derive(Args, Debug)]
pub struct RollupArgs {
    /// Template directory (a git checkout containing rollup.yaml)
    #[arg(value_name = "TEMPLATE_DIR")]
    pub template_dir: PathBuf,

    /// Project directory to update (created if missing)
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: PathBuf,

    /// Override a cookiecutter context variable (repeatable)
    #[arg(long = "extra-context", value_name = "KEY=VALUE")]
    pub extra_context: Vec<String>,

    /// Show what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the rollup command
pub fn execute(args: RollupArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let start_time = Instant::now();

    if !args.template_dir.join(CONFIG_FILE_NAME).is_file() {
        return Err(suggestions::config_not_found(
            &args.template_dir.join(CONFIG_FILE_NAME),
        ));
    }
    let extra_context = parse_key_values(&args.extra_context)?;

    if !args.quiet {
        println!(
            "{} Rolling up {} into {}",
            emoji(&out, "🔍", "[SCAN]"),
            args.template_dir.display(),
            args.target_dir.display()
        );
        if args.dry_run {
            println!(
                "{} DRY RUN MODE - No changes will be made",
                emoji(&out, "🔎", "[DRY]")
            );
        }
        println!();
    }

    let options = RollupOptions {
        extra_context,
        dry_run: args.dry_run,
        template_meta: None,
    };
    let report = execute_rollup(
        &args.template_dir,
        &args.target_dir,
        &options,
        &PlaceholderRenderer,
    )
    .with_context(|| format!("Rollup into {} failed", args.target_dir.display()))?;

    if !args.quiet {
        println!(
            "   Template: {}{}",
            report.template_meta.commit_url,
            if report.template_meta.is_git_dirty {
                " (dirty)"
            } else {
                ""
            }
        );
        for file in &report.files {
            println!("{}", format_file_line(&out, file));
        }
        println!();
        println!(
            "{} {} in {:.2}s",
            emoji(&out, "✅", "[OK]"),
            format_summary(&report),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
