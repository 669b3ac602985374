//! Read-only git queries against the template checkout
//!
//! This uses the system git command, so whatever configuration the user has
//! in `~/.gitconfig` applies. Only local, read-only commands are run here.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Run `git <args>` in `cwd` and return its trimmed stdout.
fn call_git(args: &[&str], cwd: &Path) -> Result<String> {
    let command = args.join(" ");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: cwd.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command,
            path: cwd.to_path_buf(),
            stderr: format!(
                "{}\nEnsure that it is a valid git repo.",
                stderr.trim_end()
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// URL of the `origin` remote. Fails if there is no such remote.
pub fn remote_origin_url(cwd: &Path) -> Result<String> {
    call_git(&["config", "--get", "remote.origin.url"], cwd)
}

/// Full hash of the `HEAD` commit.
pub fn head_commit_hash(cwd: &Path) -> Result<String> {
    call_git(&["rev-parse", "--verify", "HEAD"], cwd)
}

/// Whether the working tree has uncommitted changes or untracked files.
pub fn is_dirty(cwd: &Path) -> Result<bool> {
    Ok(!call_git(&["status", "--porcelain"], cwd)?.is_empty())
}

/// Symbolic name of `HEAD`, or `None` when `HEAD` is detached.
pub fn head_ref(cwd: &Path) -> Result<Option<String>> {
    let name = call_git(&["rev-parse", "--abbrev-ref", "HEAD"], cwd)?;
    if name == "HEAD" {
        Ok(None)
    } else {
        Ok(Some(name))
    }
}
