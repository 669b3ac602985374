//! Template provenance
//!
//! A rollup always runs from a git checkout of the template. Strategies get
//! a [`TemplateMeta`] describing that checkout, so they can stamp generated
//! files with a link to the exact template commit.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::git;
use crate::gitremotes::GitRemoteKind;

/// Metadata of the template's git repo status.
///
/// Built once per rollup and never re-evaluated while files are processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateMeta {
    /// Web URL of the template project.
    pub git_project_url: String,
    /// Full hex hash of the template's `HEAD` commit.
    pub commit_hash: String,
    /// Web URL of the `HEAD` commit.
    pub commit_url: String,
    /// Whether the template had uncommitted changes when it was read.
    pub is_git_dirty: bool,
    /// Branch name, or `None` for a detached `HEAD`.
    pub head_ref: Option<String>,
}

impl TemplateMeta {
    /// Read the metadata from the git checkout at `template_dir`.
    ///
    /// `git_remote_type` overrides the remote kind detected from the
    /// `origin` URL.
    pub fn from_git(template_dir: &Path, git_remote_type: Option<GitRemoteKind>) -> Result<Self> {
        let remote_url = git::remote_origin_url(template_dir)?;
        let commit_hash = git::head_commit_hash(template_dir)?;
        validate_commit_hash(&commit_hash, template_dir)?;

        let remote = match git_remote_type {
            Some(kind) => kind,
            None => GitRemoteKind::detect(&remote_url)?,
        };

        let meta = TemplateMeta {
            git_project_url: remote.project_url(&remote_url),
            commit_url: remote.commit_url(&remote_url, &commit_hash),
            commit_hash,
            is_git_dirty: git::is_dirty(template_dir)?,
            head_ref: git::head_ref(template_dir)?,
        };
        debug!("Template meta: {:?}", meta);
        Ok(meta)
    }
}

/// A commit hash must be a full-length (SHA-1 or SHA-256) lowercase hex
/// identifier. `template_dir` names the checkout in the error.
pub fn validate_commit_hash(commit_hash: &str, template_dir: &Path) -> Result<()> {
    let full_length = commit_hash.len() == 40 || commit_hash.len() == 64;
    if full_length
        && commit_hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    {
        Ok(())
    } else {
        Err(Error::GitCommand {
            command: "rev-parse --verify HEAD".to_string(),
            path: template_dir.to_path_buf(),
            stderr: format!("`{}` is not a full commit hash", commit_hash),
        })
    }
}
