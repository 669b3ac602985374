//! Phase 3: Applying Strategies
//!
//! Every rendered file is matched against the resolved strategy patterns and
//! merged with the corresponding target file. Results are staged in a
//! [`MemoryFS`]; nothing touches the target project in this phase.
//!
//! Files are processed in path order, compared component by component
//! (`a/z.txt` before `a.txt`). The first failure aborts the phase, so a
//! broken file never leaves a half-written project behind.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::filesystem::{File, MemoryFS};
use crate::path::relative_path_string;
use crate::strategies::{RollupStrategies, StrategyInput, StrategyKind};
use crate::template::TemplateMeta;

/// What a rollup does to one target file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileChange {
    /// The target file does not exist yet.
    Created,
    /// The target file exists and its content changes.
    Updated,
    /// The target file already has the resulting content.
    Unchanged,
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileChange::Created => "created",
            FileChange::Updated => "updated",
            FileChange::Unchanged => "unchanged",
        })
    }
}

/// Outcome for one rendered file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    /// `/`-separated path relative to the project root.
    pub path: String,
    /// Strategy that produced the content.
    pub strategy: StrategyKind,
    /// Pattern that selected the strategy, `None` for the default strategy.
    pub pattern: Option<String>,
    pub change: FileChange,
}

/// Output of Phase 3.
#[derive(Debug, Default)]
pub struct StagedRollup {
    /// New content for every rendered file, with the template's permissions.
    pub files: MemoryFS,
    /// One report per rendered file, in path order.
    pub reports: Vec<FileReport>,
}

/// Execute Phase 3: Merge `rendered` into the files under `target_dir`
pub fn execute(
    rendered: &MemoryFS,
    target_dir: &Path,
    strategies: &RollupStrategies,
    template_meta: &TemplateMeta,
) -> Result<StagedRollup> {
    let mut staged = StagedRollup::default();

    for directory in rendered.directories() {
        staged.files.add_directory(directory);
    }

    for (relative, template_file) in rendered.files() {
        let path = relative_path_string(relative).ok_or_else(|| Error::Filesystem {
            message: format!("Path is not valid UTF-8: '{}'", relative.display()),
        })?;
        let (pattern, node) = strategies.match_pattern(&path);
        trace!(
            "{}: strategy {} (pattern {})",
            path,
            node.kind(),
            pattern.unwrap_or("<default>")
        );

        let target_contents = read_target(&target_dir.join(relative))?;
        let input = StrategyInput::new(
            target_contents.as_deref(),
            &template_file.content,
            template_meta,
        );
        let content = node.apply(input).map_err(|e| with_file_context(e, &path))?;

        let change = match &target_contents {
            None => FileChange::Created,
            Some(existing) if existing == &content => FileChange::Unchanged,
            Some(_) => FileChange::Updated,
        };
        debug!("{}: {} by {}", path, change, node.kind());

        staged.files.add_file(
            relative,
            File::with_permissions(content, template_file.permissions),
        )?;
        staged.reports.push(FileReport {
            path,
            strategy: node.kind(),
            pattern: pattern.map(str::to_string),
            change,
        });
    }

    Ok(staged)
}

fn read_target(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Filesystem {
            message: format!("Failed to read target file '{}': {}", path.display(), e),
        }),
    }
}

/// Name the file an error happened in.
fn with_file_context(error: Error, path: &str) -> Error {
    match error {
        Error::IniParse {
            source_name,
            line,
            message,
        } => Error::IniParse {
            source_name: format!("{}.{}", path, source_name),
            line,
            message,
        },
        Error::Strategy { strategy, message } => Error::Strategy {
            strategy,
            message: format!("{}: {}", path, message),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::meta;
    use crate::strategies::StrategyNode;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn strategies(mapping: &[(&str, StrategyKind)]) -> RollupStrategies {
        let mapping: BTreeMap<String, StrategyNode> = mapping
            .iter()
            .map(|(pattern, kind)| {
                (
                    pattern.to_string(),
                    StrategyNode::with_defaults(*kind).unwrap(),
                )
            })
            .collect();
        RollupStrategies::new(
            StrategyNode::with_defaults(StrategyKind::Overwrite).unwrap(),
            &mapping,
            &BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_reports_created_updated_unchanged() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("same.txt"), "same\n").unwrap();
        fs::write(target.path().join("old.txt"), "old\n").unwrap();

        let mut rendered = MemoryFS::new();
        rendered.add_file_string("new.txt", "new\n").unwrap();
        rendered.add_file_string("old.txt", "fresh\n").unwrap();
        rendered.add_file_string("same.txt", "same\n").unwrap();

        let staged = execute(&rendered, target.path(), &strategies(&[]), &meta(false)).unwrap();
        let changes: Vec<_> = staged
            .reports
            .iter()
            .map(|r| (r.path.as_str(), r.change))
            .collect();
        assert_eq!(
            changes,
            vec![
                ("new.txt", FileChange::Created),
                ("old.txt", FileChange::Updated),
                ("same.txt", FileChange::Unchanged),
            ]
        );
        assert_eq!(staged.files.get_file("old.txt").unwrap().content, b"fresh\n");
    }

    #[test]
    fn test_pattern_selects_strategy() {
        let target = TempDir::new().unwrap();
        fs::create_dir_all(target.path().join("docs")).unwrap();
        fs::write(target.path().join("docs/notes.md"), "mine\n").unwrap();

        let mut rendered = MemoryFS::new();
        rendered.add_directory("docs");
        rendered.add_file_string("docs/notes.md", "theirs\n").unwrap();
        rendered.add_file_string("README", "readme\n").unwrap();

        let staged = execute(
            &rendered,
            target.path(),
            &strategies(&[("docs/*", StrategyKind::IfMissing)]),
            &meta(false),
        )
        .unwrap();

        assert_eq!(staged.files.get_file("docs/notes.md").unwrap().content, b"mine\n");
        let report = staged
            .reports
            .iter()
            .find(|r| r.path == "docs/notes.md")
            .unwrap();
        assert_eq!(report.strategy, StrategyKind::IfMissing);
        assert_eq!(report.pattern.as_deref(), Some("docs/*"));
        assert_eq!(report.change, FileChange::Unchanged);
        assert_eq!(
            staged.files.directories().cloned().collect::<Vec<_>>(),
            vec![PathBuf::from("docs")]
        );
    }

    #[test]
    fn test_ini_errors_name_the_file() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("tox.ini"), "key = value\n").unwrap();

        let mut rendered = MemoryFS::new();
        rendered.add_file_string("tox.ini", "[tox]\n").unwrap();

        let err = execute(
            &rendered,
            target.path(),
            &strategies(&[("tox.ini", StrategyKind::ConfigParserMerge)]),
            &meta(false),
        )
        .unwrap_err();
        match err {
            Error::IniParse { source_name, .. } => assert_eq!(source_name, "tox.ini.target"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_keeps_template_permissions() {
        let target = TempDir::new().unwrap();
        let mut rendered = MemoryFS::new();
        rendered
            .add_file("run.sh", File::with_permissions(b"#!/bin/sh\n".to_vec(), 0o755))
            .unwrap();

        let staged = execute(&rendered, target.path(), &strategies(&[]), &meta(false)).unwrap();
        assert_eq!(staged.files.get_file("run.sh").unwrap().permissions, 0o755);
    }
}
