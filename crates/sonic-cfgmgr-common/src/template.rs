//! Template fetching and rendering.
//!
//! Candidate configurations are produced from templates kept outside the
//! device (a salt-style file tree: `<root>/<env>/<name>`). Rendering uses
//! Handlebars against a JSON context.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::Value;
use tracing::debug;

use crate::error::{CfgMgrError, CfgMgrResult};

/// URL-style prefix accepted in front of template names.
pub const SALT_PREFIX: &str = "salt://";

/// Collaborator turning a template name and context into configuration text.
#[async_trait]
pub trait Templating: Send + Sync {
    /// Fetches the raw template text for `name` in environment `env`.
    async fn fetch_source(&self, name: &str, env: &str) -> CfgMgrResult<String>;

    /// Renders `source` against `context`.
    ///
    /// `name` is only used for error reporting.
    fn render(&self, name: &str, source: &str, context: &Value) -> CfgMgrResult<String>;
}

/// Renders a Handlebars template string.
pub fn render_handlebars(
    registry: &Handlebars<'_>,
    name: &str,
    source: &str,
    context: &Value,
) -> CfgMgrResult<String> {
    registry
        .render_template(source, context)
        .map_err(|e| CfgMgrError::template(name, format!("Error rendering template: {e}")))
}

/// Builds a Handlebars registry configured for configuration files.
///
/// HTML escaping is disabled: output is device configuration, not markup.
pub fn config_registry(strict: bool) -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(strict);
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

/// Strips the optional `salt://` prefix from a template name.
pub fn strip_salt_prefix(name: &str) -> &str {
    name.strip_prefix(SALT_PREFIX).unwrap_or(name)
}

/// Filesystem-backed templating rooted at a salt-style tree.
pub struct FileTemplating {
    root: PathBuf,
    handlebars: Handlebars<'static>,
}

impl FileTemplating {
    /// Creates a templating collaborator reading from `root`.
    pub fn new(root: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            root: root.into(),
            handlebars: config_registry(strict),
        }
    }

    /// Returns the template root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a template name to its path under `<root>/<env>/`.
    pub fn resolve(&self, name: &str, env: &str) -> PathBuf {
        self.root.join(env).join(strip_salt_prefix(name))
    }
}

#[async_trait]
impl Templating for FileTemplating {
    async fn fetch_source(&self, name: &str, env: &str) -> CfgMgrResult<String> {
        let path = self.resolve(name, env);
        debug!(template = %name, path = %path.display(), "Fetching template source");

        let content = tokio::fs::read_to_string(&path)
            .await
            .unwrap_or_default();
        if content.is_empty() {
            return Err(CfgMgrError::template(name, format!("Unable to get {name}")));
        }
        Ok(content)
    }

    fn render(&self, name: &str, source: &str, context: &Value) -> CfgMgrResult<String> {
        render_handlebars(&self.handlebars, name, source, context)
    }
}
