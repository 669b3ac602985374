//! In-memory filesystem used to stage a rollup
//!
//! The rendered template is loaded into a [`MemoryFS`], strategies write
//! their results into a second one, and only when every file has been
//! processed is the staged tree written to the target project. Paths are
//! relative to the tree root.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Permission bits of files created without explicit permissions.
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// Represents a file with content and permission bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// Unix permission bits (`0o777` mask)
    pub permissions: u32,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self::with_permissions(content, DEFAULT_PERMISSIONS)
    }

    pub fn with_permissions(content: Vec<u8>, permissions: u32) -> Self {
        Self {
            content,
            permissions: permissions & 0o777,
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }
}

/// In-memory filesystem with sorted iteration
///
/// Paths sort component by component, so `a/z.txt` comes before `a.txt`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, File>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file and directory below `root`.
    ///
    /// Symlinks to files are read as regular files; other symlinks are
    /// skipped.
    pub fn load_from_dir(root: &Path) -> Result<Self> {
        let mut memory_fs = Self::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: format!("Failed to walk '{}': {}", root.display(), e),
            })?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| Error::Filesystem {
                    message: format!("'{}' is outside '{}': {}", entry.path().display(), root.display(), e),
                })?
                .to_path_buf();

            let file_type = entry.file_type();
            if file_type.is_dir() {
                memory_fs.add_directory(&relative);
            } else if file_type.is_file() || entry.path().is_file() {
                let content = fs::read(entry.path())?;
                let permissions = permission_bits(&fs::metadata(entry.path())?);
                memory_fs.add_file(&relative, File::with_permissions(content, permissions))?;
            } else {
                debug!("Skipping '{}': not a regular file", entry.path().display());
            }
        }

        Ok(memory_fs)
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || path.is_absolute() {
            return Err(Error::Filesystem {
                message: format!("Invalid relative path: '{}'", path.display()),
            });
        }
        self.files.insert(path.to_path_buf(), file);
        Ok(())
    }

    /// Add a file with content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) -> Result<()> {
        self.add_file(path, File::new(content))
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Record a directory, which is created even when it stays empty.
    pub fn add_directory<P: AsRef<Path>>(&mut self, path: P) {
        self.directories.insert(path.as_ref().to_path_buf());
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files in sorted order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Recorded directories in sorted order
    pub fn directories(&self) -> impl Iterator<Item = &PathBuf> {
        self.directories.iter()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the filesystem has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files in sorted order
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        DEFAULT_PERMISSIONS
    }
}
