//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TemplateFixture::new().with_minimal_template();
//! fixture.command().arg("rollup").arg(fixture.template_dir()).arg(fixture.target_dir());
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::templates;
    pub use super::TemplateFixture;
}

/// Common template file snippets for testing.
#[allow(dead_code)]
pub mod templates {
    /// `rollup.yaml` with a merge strategy for `.gitignore` and `setup.cfg`.
    pub const ROLLUP_YAML: &str = r#"
default_strategy: template_rollup.strategies.Overwrite
strategies_mapping:
  .gitignore: template_rollup.strategies.SortedUniqueLines
  setup.cfg:
    strategy: template_rollup.strategies.SetupCfgMerge
    config:
      merge_requirements:
        - sections: ^options$
          keys: ^install_requires$
  'src/{{ cookiecutter.package }}/version.py': template_rollup.strategies.IfMissing
  '*.ini': template_rollup.strategies.TemplateHash
"#;

    pub const COOKIECUTTER_JSON: &str =
        r#"{"project_dest": "project", "package": "{{ cookiecutter.project_dest }}_pkg"}"#;

    pub const ROLLUP_CONF: &str = "[cookiecutter_context]\n\
        project_dest = {{ cookiecutter.project_dest }}\n\
        package = {{ cookiecutter.package }}\n";

    pub const SETUP_CFG: &str =
        "[metadata]\nname = {{ cookiecutter.project_dest }}\n\n[options]\ninstall_requires =\n    requests\n";

    /// URL of the fake `origin` remote.
    pub const REMOTE_URL: &str = "https://github.com/example/template.git";
}

/// A template directory and an (initially missing) target project.
pub struct TemplateFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TemplateFixture {
    /// Create a fixture with an empty template directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("template")
            .create_dir_all()
            .expect("Failed to create template directory");
        Self { temp_dir }
    }

    /// A template with a config, a context file and a few project files.
    pub fn with_minimal_template(self) -> Self {
        self.with_template_file("rollup.yaml", templates::ROLLUP_YAML)
            .with_template_file("cookiecutter.json", templates::COOKIECUTTER_JSON)
            .with_project_file(".rollup.conf", templates::ROLLUP_CONF)
            .with_project_file(".gitignore", "*.pyc\n")
            .with_project_file("setup.cfg", templates::SETUP_CFG)
            .with_project_file("tox.ini", "[tox]\nenvlist = py3\n")
            .with_project_file("src/{{ cookiecutter.package }}/version.py", "VERSION = '0.1'\n")
            .with_project_file("README.md", "# {{ cookiecutter.project_dest }}\n")
    }

    /// Add a file at the template root.
    pub fn with_template_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("template")
            .child(path)
            .write_str(content)
            .expect("Failed to write template file");
        self
    }

    /// Add a file below the template's project directory.
    pub fn with_project_file(self, path: &str, content: &str) -> Self {
        self.with_template_file(&format!("{{{{ cookiecutter.project_dest }}}}/{}", path), content)
    }

    /// Add a file to the target project.
    pub fn with_target_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("project")
            .child(path)
            .write_str(content)
            .expect("Failed to write target file");
        self
    }

    /// Turn the template into a git checkout with one commit and an origin.
    pub fn with_git(self) -> Self {
        let dir = self.template_dir();
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["remote", "add", "origin", templates::REMOTE_URL]);
        self.commit("Initial template")
    }

    /// Commit every change in the template.
    pub fn commit(self, message: &str) -> Self {
        let dir = self.template_dir();
        git(&dir, &["add", "--all"]);
        git(
            &dir,
            &[
                "-c",
                "user.name=Template Author",
                "-c",
                "user.email=author@example.com",
                "commit",
                "--quiet",
                "-m",
                message,
            ],
        );
        self
    }

    /// Hash of the template's `HEAD` commit.
    pub fn head_commit(&self) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.template_dir())
            .output()
            .expect("Failed to run git");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn template_dir(&self) -> PathBuf {
        self.temp_dir.path().join("template")
    }

    /// The target project, named `project`.
    pub fn target_dir(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    /// Read a file of the target project.
    pub fn read_target(&self, path: &str) -> String {
        std::fs::read_to_string(self.target_dir().join(path)).expect("Failed to read target file")
    }

    /// A file of the target project, for `assert_fs` assertions.
    pub fn child_of_target(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("project").child(path)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command for the template-rollup binary.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("template-rollup");
        cmd.current_dir(self.path()).env("NO_COLOR", "1");
        cmd
    }

    /// `template-rollup rollup <template> <target>`
    pub fn rollup_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("rollup")
            .arg(self.template_dir())
            .arg(self.target_dir());
        cmd
    }
}

impl Default for TemplateFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}
