//! Phase 2: Rendering the Template
//!
//! The template is rendered into a scratch directory and checked:
//!
//! 1.  The scratch directory must hold exactly one entry, named after
//!     `project_dest`.
//! 2.  The rendered project must contain its own cookiecutter context, and
//!     that context must not be empty. It becomes the context used to
//!     resolve the strategy patterns.
//!
//! A template failing either check is malformed, which is reported as
//! [`Error::InvalidTemplate`](crate::error::Error::InvalidTemplate).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::context::PROJECT_DEST;
use crate::cookiecutter::{ContextReaderKind, CookiecutterContext};
use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;
use crate::renderer::Renderer;

/// Output of Phase 2.
#[derive(Debug)]
pub struct RenderedProject {
    /// Root of the rendered project inside the scratch directory.
    pub root: PathBuf,
    /// Context read back from the rendered project.
    pub context: CookiecutterContext,
    /// The rendered files.
    pub files: MemoryFS,
}

/// Execute Phase 2: Render `template_dir` into `scratch_dir`
pub fn execute(
    renderer: &dyn Renderer,
    template_dir: &Path,
    context: &CookiecutterContext,
    reader: ContextReaderKind,
    scratch_dir: &Path,
) -> Result<RenderedProject> {
    let root = renderer.render(template_dir, context, scratch_dir)?;

    let project_dest = context.get(PROJECT_DEST).cloned().unwrap_or_default();
    let mut entries: Vec<String> = fs::read_dir(scratch_dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    if entries != [project_dest.clone()] {
        return Err(Error::InvalidTemplate {
            message: format!(
                "the rendered template must contain exactly one directory named `{}`, found {:?}",
                project_dest, entries
            ),
        });
    }
    if root != scratch_dir.join(&project_dest) {
        return Err(Error::InvalidTemplate {
            message: format!(
                "the template rendered into `{}` instead of `{}`",
                root.display(),
                project_dest
            ),
        });
    }

    let rendered_context = match reader.read(&root) {
        Ok(context) => context,
        Err(Error::ContextNotFound { .. }) => {
            return Err(Error::InvalidTemplate {
                message: format!(
                    "the rendered project has no `{}`; the template must render its cookiecutter context",
                    reader.file_name()
                ),
            })
        }
        Err(e) => return Err(e),
    };
    if rendered_context.is_empty() {
        return Err(Error::InvalidTemplate {
            message: format!(
                "the cookiecutter context in the rendered `{}` is empty",
                reader.file_name()
            ),
        });
    }

    let files = MemoryFS::load_from_dir(&root)?;
    info!("Template rendered: {} file(s)", files.len());

    Ok(RenderedProject {
        root,
        context: rendered_context,
        files,
    })
}
