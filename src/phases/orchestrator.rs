//! Orchestrator for the complete rollup operation
//!
//! This module coordinates all phases to provide a clean API for rolling a
//! template out into one target project.

use std::path::Path;

use log::info;

use super::apply::{FileChange, FileReport};
use super::{phase1, phase2, phase3, phase4};
use crate::config::RollupConfig;
use crate::cookiecutter::CookiecutterContext;
use crate::error::{Error, Result};
use crate::renderer::Renderer;
use crate::template::TemplateMeta;

/// Caller-supplied knobs of a rollup.
#[derive(Debug, Clone, Default)]
pub struct RollupOptions {
    /// Variables overriding the target's stored cookiecutter context.
    pub extra_context: CookiecutterContext,
    /// Compute the result without writing anything.
    pub dry_run: bool,
    /// Template provenance to use instead of asking git.
    pub template_meta: Option<TemplateMeta>,
}

/// Result of a rollup.
#[derive(Debug, Clone)]
pub struct RollupReport {
    /// One entry per rendered file, in path order.
    pub files: Vec<FileReport>,
    pub template_meta: TemplateMeta,
    /// Whether the files were left untouched.
    pub dry_run: bool,
}

impl RollupReport {
    /// Number of files with the given change.
    pub fn count(&self, change: FileChange) -> usize {
        self.files.iter().filter(|f| f.change == change).count()
    }

    /// Whether the rollup changes (or changed) any file.
    pub fn has_changes(&self) -> bool {
        self.files.iter().any(|f| f.change != FileChange::Unchanged)
    }
}

/// Execute the complete rollup operation
///
/// 1. Load `rollup.yaml` and the template's git metadata
/// 2. Build the render context from the target project
/// 3. Render the template into a scratch directory
/// 4. Apply a strategy to every rendered file
/// 5. Write the staged files into `target_dir` (skipped for a dry run)
///
/// Every configuration and parse error surfaces before the first write.
pub fn execute_rollup(
    template_dir: &Path,
    target_dir: &Path,
    options: &RollupOptions,
    renderer: &dyn Renderer,
) -> Result<RollupReport> {
    let config = RollupConfig::from_template_dir(template_dir)?;

    let template_meta = match &options.template_meta {
        Some(meta) => meta.clone(),
        None => TemplateMeta::from_git(template_dir, config.git_remote_type)?,
    };
    info!(
        "Rolling up {} at {}{}",
        template_meta.git_project_url,
        template_meta.commit_hash,
        if template_meta.is_git_dirty { " (dirty)" } else { "" }
    );

    // Phase 1: Render context
    let context = phase1::execute(
        target_dir,
        config.cookiecutter_context_type,
        &options.extra_context,
    )?;

    // Phase 2: Render into a scratch directory
    let scratch = tempfile::Builder::new()
        .prefix("template-rollup")
        .tempdir()
        .map_err(|e| Error::Filesystem {
            message: format!("Failed to create a scratch directory: {}", e),
        })?;
    let rendered = phase2::execute(
        renderer,
        template_dir,
        &context,
        config.cookiecutter_context_type,
        scratch.path(),
    )?;

    // Phase 3: Apply strategies
    let strategies = config.resolve_strategies(&rendered.context)?;
    let staged = phase3::execute(&rendered.files, target_dir, &strategies, &template_meta)?;

    // Phase 4: Write to disk
    if options.dry_run {
        info!("Dry run: {} file(s) left untouched", staged.files.len());
    } else {
        phase4::execute(&staged.files, target_dir)?;
        info!("Wrote {} file(s) to {}", staged.files.len(), target_dir.display());
    }

    Ok(RollupReport {
        files: staged.reports,
        template_meta,
        dry_run: options.dry_run,
    })
}
