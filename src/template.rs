//! Template rendering.
//!
//! The build talks to templates through the [`TemplateEngine`] trait: a
//! layout name and a JSON context in, text out. The production
//! implementation is [`TeraEngine`], which loads every file under the
//! project's templates directory and names each one by its path relative to
//! that directory (`page.html`, `partials/nav.html`).
//!
//! Tera auto-escapes `.html` templates, so rendered Markdown must be emitted
//! with the `safe` filter: `{{ content | safe }}`.

use serde_json::Value;
use std::error::Error as _;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template \"{0}\" not found")]
    NotFound(String),
    #[error("{0}")]
    Render(String),
    #[error("failed to load templates from {path}: {message}")]
    Load { path: PathBuf, message: String },
}

/// Renders a named layout with a context.
pub trait TemplateEngine {
    fn render(&self, layout: &str, context: &Value) -> Result<String, TemplateError>;
}

/// [`TemplateEngine`] backed by Tera.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Load every file under `dir` as a template.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let load_err = |message: String| TemplateError::Load {
            path: dir.to_path_buf(),
            message,
        };

        if !dir.is_dir() {
            return Err(load_err("directory not found".into()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| load_err(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| load_err(e.to_string()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push((entry.path().to_path_buf(), Some(name)));
        }

        let mut tera = Tera::default();
        tera.add_template_files(files)
            .map_err(|e| load_err(error_chain(&e)))?;
        Ok(Self { tera })
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    pub fn from_templates<'a, I>(templates: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::Load {
                path: PathBuf::new(),
                message: error_chain(&e),
            })?;
        Ok(Self { tera })
    }

    /// Names of all loaded templates, sorted.
    #[cfg(test)]
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

impl TemplateEngine for TeraEngine {
    fn render(&self, layout: &str, context: &Value) -> Result<String, TemplateError> {
        let context =
            Context::from_value(context.clone()).map_err(|e| TemplateError::Render(error_chain(&e)))?;
        self.tera.render(layout, &context).map_err(|e| match e.kind {
            tera::ErrorKind::TemplateNotFound(name) => TemplateError::NotFound(name),
            _ => TemplateError::Render(error_chain(&e)),
        })
    }
}

/// Flatten an error and its sources into one line. Tera reports the useful
/// part (which variable, which line) in the innermost source.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
