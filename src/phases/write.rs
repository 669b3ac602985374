//! Phase 4: Writing to Disk
//!
//! This is the final phase of a rollup. It writes the staged filesystem into
//! the target project.
//!
//! ## Process
//!
//! 1.  **Create Directories**: Every recorded directory is created, including
//!     empty ones. Existing directories are left as they are.
//!
//! 2.  **Write Content**: Each file is written, replacing the target file.
//!
//! 3.  **Set Permissions**: On Unix-like systems, the file gets the permission
//!     bits of the template file it came from.
//!
//! Nothing is rolled back if a write fails halfway: re-running the rollup
//! converges to the same result.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Execute Phase 4: Write the staged filesystem below `output_path`
pub fn execute(staged_fs: &MemoryFS, output_path: &Path) -> Result<()> {
    fs::create_dir_all(output_path).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to create directory '{}': {}",
            output_path.display(),
            e
        ),
    })?;

    for directory in staged_fs.directories() {
        let full_path = output_path.join(directory);
        fs::create_dir_all(&full_path).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", full_path.display(), e),
        })?;
    }

    for (relative_path, file) in staged_fs.files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(file.permissions);
            fs::set_permissions(&full_path, perms).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to set permissions on '{}': {}",
                    full_path.display(),
                    e
                ),
            })?;
        }

        debug!("Wrote {}", full_path.display());
    }

    Ok(())
}
