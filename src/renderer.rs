//! Template rendering
//!
//! Rendering turns the template directory into a concrete project for a given
//! cookiecutter context. The rollup only needs the rendered tree, so any
//! engine can be plugged in through the [`Renderer`] trait.
//!
//! The built-in [`PlaceholderRenderer`] understands the subset of the
//! cookiecutter layout that rollups rely on:
//!
//! ```text
//! template/
//! ├── cookiecutter.json              # variables and their defaults
//! ├── rollup.yaml
//! └── {{ cookiecutter.project_dest }}/
//!     ├── .rollup.conf
//!     └── src/{{ cookiecutter.package }}/__init__.py
//! ```
//!
//! `{{ cookiecutter.name }}` (or `{{ name }}`) placeholders are substituted in
//! path components and in the contents of UTF-8 files. Binary files, and files
//! matching a `_copy_without_render` glob, are copied verbatim. Permission
//! bits are kept.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cookiecutter::CookiecutterContext;
use crate::error::{Error, Result};
use crate::filesystem::{File, MemoryFS};
use crate::path::{compile_glob, has_placeholders, relative_path_string, substitute_placeholders};
use crate::phases::write;

/// Name of the variables file in the template root.
pub const COOKIECUTTER_JSON: &str = "cookiecutter.json";

/// Key of `cookiecutter.json` listing globs of files copied without rendering.
const COPY_WITHOUT_RENDER: &str = "_copy_without_render";

/// Renders a template directory into a project.
pub trait Renderer {
    /// Render `template_dir` with `context` into `output_dir`.
    ///
    /// `output_dir` exists and is empty. Returns the root of the rendered
    /// project, which must be a direct child of `output_dir`.
    fn render(
        &self,
        template_dir: &Path,
        context: &CookiecutterContext,
        output_dir: &Path,
    ) -> Result<PathBuf>;
}

/// Built-in renderer substituting `{{ cookiecutter.* }}` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(
        &self,
        template_dir: &Path,
        context: &CookiecutterContext,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let (defaults, copy_without_render) = read_cookiecutter_json(template_dir)?;
        let variables = resolve_variables(&defaults, context)?;
        let project_template = find_project_template(template_dir)?;

        let copy_patterns = copy_without_render
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>>>()?;

        let source = MemoryFS::load_from_dir(&project_template)?;
        let mut rendered = MemoryFS::new();

        for directory in source.directories() {
            rendered.add_directory(render_path(directory, &variables)?);
        }

        for (path, file) in source.files() {
            let target_path = render_path(path, &variables)?;
            let relative = relative_path_string(path).unwrap_or_default();
            let verbatim = copy_patterns.iter().any(|p| p.matches(&relative));

            let content = match std::str::from_utf8(&file.content) {
                Ok(text) if !verbatim => substitute_placeholders(text, &variables)
                    .map_err(|e| in_file(e, &relative))?
                    .into_bytes(),
                _ => file.content.clone(),
            };
            rendered.add_file(&target_path, File::with_permissions(content, file.permissions))?;
        }

        let project_name = project_template
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root = output_dir.join(substitute_placeholders(&project_name, &variables)?);

        fs::create_dir_all(&root)?;
        write::execute(&rendered, &root)?;
        info!("Rendered {} file(s) into {}", rendered.len(), root.display());
        Ok(root)
    }
}

/// Variables the built-in renderer uses: the `cookiecutter.json` defaults of
/// `template_dir` with `context` laid over them.
pub fn template_variables(
    template_dir: &Path,
    context: &CookiecutterContext,
) -> Result<CookiecutterContext> {
    let (defaults, _) = read_cookiecutter_json(template_dir)?;
    resolve_variables(&defaults, context)
}

type Defaults = Vec<(String, serde_json::Value)>;

/// Read variable defaults and the `_copy_without_render` globs.
fn read_cookiecutter_json(template_dir: &Path) -> Result<(Defaults, Vec<String>)> {
    let path = template_dir.join(COOKIECUTTER_JSON);
    if !path.is_file() {
        return Err(Error::InvalidTemplate {
            message: format!("{} not found in {}", COOKIECUTTER_JSON, template_dir.display()),
        });
    }

    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
    let serde_json::Value::Object(object) = value else {
        return Err(Error::InvalidTemplate {
            message: format!("{} must contain a JSON object", path.display()),
        });
    };

    let mut copy_without_render = Vec::new();
    let mut defaults = Vec::new();
    for (key, value) in object {
        if key == COPY_WITHOUT_RENDER {
            if let serde_json::Value::Array(items) = &value {
                copy_without_render.extend(items.iter().filter_map(|i| i.as_str().map(String::from)));
            }
            continue;
        }
        defaults.push((key, value));
    }
    Ok((defaults, copy_without_render))
}

/// Text of a default value: strings as-is, the first choice of a list,
/// JSON text for anything else.
fn default_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(items) => items.first().map(default_text).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Overlay `context` on the defaults. Defaults may refer to other variables,
/// so they are substituted until every one resolves.
fn resolve_variables(defaults: &Defaults, context: &CookiecutterContext) -> Result<CookiecutterContext> {
    let mut variables = context.clone();
    let mut pending: Vec<(&str, String)> = defaults
        .iter()
        .filter(|(key, _)| !context.contains_key(key))
        .map(|(key, value)| (key.as_str(), default_text(value)))
        .collect();

    while !pending.is_empty() {
        let before = pending.len();
        let mut unresolved = Vec::new();
        let mut last_error = None;

        for (key, text) in pending {
            match substitute_placeholders(&text, &variables) {
                Ok(value) => {
                    variables.insert(key.to_string(), value);
                }
                Err(e) => {
                    last_error = Some(e);
                    unresolved.push((key, text));
                }
            }
        }

        if unresolved.len() == before {
            if let Some(error) = last_error {
                return Err(error);
            }
        }
        pending = unresolved;
    }

    debug!("Render variables: {:?}", variables);
    Ok(variables)
}

/// The single `{{ ... }}` directory holding the project template.
fn find_project_template(template_dir: &Path) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(template_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() && has_placeholders(&entry.file_name().to_string_lossy()) {
            candidates.push(entry.path());
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(Error::InvalidTemplate {
            message: format!(
                "{} has no `{{{{ cookiecutter.project_dest }}}}` directory",
                template_dir.display()
            ),
        }),
        _ => Err(Error::InvalidTemplate {
            message: format!(
                "{} has more than one templated top-level directory",
                template_dir.display()
            ),
        }),
    }
}

fn render_path(path: &Path, variables: &CookiecutterContext) -> Result<PathBuf> {
    let text = relative_path_string(path).ok_or_else(|| Error::Filesystem {
        message: format!("Unexpected path in template: '{}'", path.display()),
    })?;
    Ok(PathBuf::from(substitute_placeholders(&text, variables)?))
}

fn in_file(error: Error, path: &str) -> Error {
    match error {
        Error::Template { message, variable } => Error::Template {
            message: format!("{} (in {})", message, path),
            variable,
        },
        other => other,
    }
}
