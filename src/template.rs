//! # Template Module
//!
//! [`TemplateEngine`] wraps a `minijinja` environment that loads templates
//! from a directory. Build it once at startup and share it by `Arc` with the
//! handlers that render pages.
//!
//! Auto-escaping follows the template's file extension: `.html`, `.htm` and
//! `.xml` templates are HTML-escaped, everything else is rendered verbatim.
//!
//! ```rust,no_run
//! use pigeon::template::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new("templates");
//! let response = engine.render("index.html", json!({ "title": "Home" }), 200).unwrap();
//! assert_eq!(response.content_type(), Some("text/html"));
//! ```

use minijinja::Environment;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::error::TemplateError;
use crate::server::Response;

/// Template loader and renderer
pub struct TemplateEngine {
    env: Environment<'static>,
    templates_dir: PathBuf,
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates_dir", &self.templates_dir)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create an engine loading templates from `templates_dir`
    ///
    /// Templates are read lazily on first use and cached by the environment.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(templates_dir: P) -> Self {
        let templates_dir = templates_dir.into();
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir.clone()));
        debug!(templates_dir = %templates_dir.display(), "Template engine created");
        Self { env, templates_dir }
    }

    #[must_use]
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Render a template into a response
    ///
    /// The response content type is guessed from the template name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the template is missing or fails to render.
    pub fn render<S: Serialize>(
        &self,
        name: &str,
        context: S,
        status: u16,
    ) -> Result<Response, TemplateError> {
        let body = self
            .env
            .get_template(name)
            .and_then(|template| template.render(context))
            .map_err(|source| {
                error!(template = %name, error = %source, "Template rendering failed");
                TemplateError::Render {
                    name: name.to_string(),
                    source,
                }
            })?;
        Ok(Response::new(status, content_type_for(name), body))
    }

    /// Render an inline template source
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the source fails to parse or render.
    pub fn render_str<S: Serialize>(&self, source: &str, context: S) -> Result<String, TemplateError> {
        self.env
            .render_str(source, context)
            .map_err(|err| TemplateError::Render {
                name: "<inline>".to_string(),
                source: err,
            })
    }
}

/// Guess a content type from a template file name
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
