//! Phase 1: Gathering the Render Context
//!
//! The variables for rendering come from three places, later ones winning:
//!
//! 1.  The cookiecutter context stored in the target project by a previous
//!     rollup. A project without one (a first rollup) starts empty.
//! 2.  The caller's extra context (`--extra-context KEY=VALUE`).
//! 3.  `project_dest`, which defaults to the target directory's name when
//!     neither of the above sets it.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::info;

use crate::cookiecutter::{ContextReaderKind, CookiecutterContext};
use crate::error::{Error, Result};

/// Variable naming the rendered project's directory.
pub const PROJECT_DEST: &str = "project_dest";

/// Execute Phase 1: Build the render context for `target_dir`
pub fn execute(
    target_dir: &Path,
    reader: ContextReaderKind,
    extra_context: &CookiecutterContext,
) -> Result<CookiecutterContext> {
    let mut context = match reader.read(target_dir) {
        Ok(context) => context,
        Err(Error::ContextNotFound { path }) => {
            info!(
                "No cookiecutter context at {}, starting from an empty one",
                path.display()
            );
            CookiecutterContext::new()
        }
        Err(e) => return Err(e),
    };

    context.extend(
        extra_context
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    if !context.contains_key(PROJECT_DEST) {
        context.insert(PROJECT_DEST.to_string(), directory_name(target_dir)?);
    }

    Ok(context)
}

/// Name of `dir` once `.`, `..` and symlinks are resolved.
///
/// `dir` itself may not exist yet.
pub fn directory_name(dir: &Path) -> Result<String> {
    resolve_dir(dir)?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Filesystem {
            message: format!("Cannot determine the directory name of '{}'", dir.display()),
        })
}

/// Absolute form of `dir`: existing ancestors are canonicalized, the
/// missing tail is normalized lexically.
fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in std::path::absolute(dir)?.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
        if resolved.exists() {
            resolved = fs::canonicalize(&resolved)?;
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pairs(items: &[(&str, &str)]) -> CookiecutterContext {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_context_defaults_project_dest() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("my-project");

        let context =
            execute(&target, ContextReaderKind::RollupConf, &CookiecutterContext::new()).unwrap();
        assert_eq!(context, pairs(&[("project_dest", "my-project")]));
    }

    #[test]
    fn test_extra_context_wins_over_stored_context() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".rollup.conf"),
            "[cookiecutter_context]\nproject_dest = stored\nlicense = MIT\n",
        )
        .unwrap();

        let context = execute(
            temp.path(),
            ContextReaderKind::RollupConf,
            &pairs(&[("license", "BSD"), ("extra", "1")]),
        )
        .unwrap();

        assert_eq!(
            context,
            pairs(&[("extra", "1"), ("license", "BSD"), ("project_dest", "stored")])
        );
    }

    #[test]
    fn test_broken_context_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".rollup.conf"), "no section\n").unwrap();

        let err = execute(temp.path(), ContextReaderKind::RollupConf, &CookiecutterContext::new())
            .unwrap_err();
        assert!(matches!(err, Error::IniParse { .. }));
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(directory_name(Path::new("/work/project")).unwrap(), "project");
        assert_eq!(directory_name(Path::new("/work/project/.")).unwrap(), "project");
        assert!(!directory_name(Path::new(".")).unwrap().is_empty());
    }

    #[test]
    fn test_directory_name_resolves_parent_components() {
        let temp = TempDir::new().unwrap();
        let expected = fs::canonicalize(temp.path())
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();

        fs::create_dir(temp.path().join("child")).unwrap();
        assert_eq!(directory_name(&temp.path().join("child").join("..")).unwrap(), expected);
        assert_eq!(directory_name(&temp.path().join("missing").join("..")).unwrap(), expected);
        assert_eq!(
            directory_name(&temp.path().join("a").join("b").join("..").join("c")).unwrap(),
            "c"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_name_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        assert_eq!(directory_name(&temp.path().join("link")).unwrap(), "real");
    }

    #[test]
    fn test_parent_path_sets_project_dest() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("my-project");
        fs::create_dir_all(project.join("sub")).unwrap();

        let context = execute(
            &project.join("sub").join(".."),
            ContextReaderKind::RollupConf,
            &CookiecutterContext::new(),
        )
        .unwrap();
        assert_eq!(context, pairs(&[("project_dest", "my-project")]));
    }
}
