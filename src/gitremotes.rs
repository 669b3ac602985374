//! Git remote URL builders
//!
//! Strategies render links to the template's commit on the code hosting web
//! interface. A [`GitRemoteKind`] turns a git remote (ssh or http) into the
//! project URL and a commit URL.
//!
//! The kind is detected from the remote URL, or set explicitly in
//! `rollup.yaml`:
//!
//! ```yaml
//! git_remote_type: template_rollup.gitremotes.GitLab
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Supported code hosting services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GitRemoteKind {
    GitHub,
    GitLab,
    BitBucket,
}

impl GitRemoteKind {
    pub const ALL: [GitRemoteKind; 3] = [
        GitRemoteKind::GitHub,
        GitRemoteKind::GitLab,
        GitRemoteKind::BitBucket,
    ];

    /// Name used in `gitremotes.<Name>` references.
    pub fn name(self) -> &'static str {
        match self {
            GitRemoteKind::GitHub => "GitHub",
            GitRemoteKind::GitLab => "GitLab",
            GitRemoteKind::BitBucket => "BitBucket",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Detect the hosting service from a remote URL.
    pub fn detect(remote: &str) -> Result<Self> {
        let lowered = remote.to_lowercase();
        if lowered.contains("gitlab") {
            Ok(GitRemoteKind::GitLab)
        } else if lowered.contains("github") {
            Ok(GitRemoteKind::GitHub)
        } else if lowered.contains("bitbucket") {
            Ok(GitRemoteKind::BitBucket)
        } else {
            Err(Error::ConfigParse {
                message: format!(
                    "Unable to determine the git remote type of `{}`",
                    remote
                ),
                hint: Some(
                    "Set `git_remote_type` in rollup.yaml, e.g. \
                     `template_rollup.gitremotes.GitLab`"
                        .to_string(),
                ),
            })
        }
    }

    /// Web URL of the project.
    pub fn project_url(&self, remote: &str) -> String {
        remote_to_https(remote)
    }

    /// Web URL of a commit.
    pub fn commit_url(&self, remote: &str, commit_hash: &str) -> String {
        let project_url = self.project_url(remote);
        let project_url = project_url.trim_end_matches('/');
        match self {
            GitRemoteKind::GitHub | GitRemoteKind::GitLab => {
                format!("{}/commit/{}", project_url, commit_hash)
            }
            GitRemoteKind::BitBucket => format!("{}/commits/{}", project_url, commit_hash),
        }
    }
}

/// `git@host:group/project.git` -> `https://host/group/project`
fn remote_to_https(remote: &str) -> String {
    static SCP_LIKE: OnceLock<Regex> = OnceLock::new();
    let scp_like = SCP_LIKE.get_or_init(|| {
        Regex::new(r"^[^@/]*@([^:]+):").expect("hardcoded regex is valid")
    });

    let url = scp_like.replace(remote, "https://$1/");
    url.strip_suffix(".git").unwrap_or(&url).to_string()
}
