//! In-memory templating collaborator

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use sonic_cfgmgr_common::template::{config_registry, render_handlebars};
use sonic_cfgmgr_common::{CfgMgrError, CfgMgrResult, Templating};

/// Templating backed by a map of template name to source.
///
/// Rendering goes through the same Handlebars registry setup as the
/// file-backed implementation, in strict mode.
#[derive(Default)]
pub struct MemoryTemplating {
    sources: HashMap<String, String>,
    fetched: Mutex<Vec<(String, String)>>,
}

impl MemoryTemplating {
    /// Create an empty templating collaborator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template source under `name`
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(name.into(), source.into());
        self
    }

    /// `(name, env)` pairs fetched so far
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.fetched
            .lock()
            .expect("templating state poisoned")
            .clone()
    }
}

#[async_trait]
impl Templating for MemoryTemplating {
    async fn fetch_source(&self, name: &str, env: &str) -> CfgMgrResult<String> {
        self.fetched
            .lock()
            .expect("templating state poisoned")
            .push((name.to_string(), env.to_string()));

        match self.sources.get(name) {
            Some(source) if !source.is_empty() => Ok(source.clone()),
            _ => Err(CfgMgrError::template(name, format!("Unable to get {name}"))),
        }
    }

    fn render(&self, name: &str, source: &str, context: &Value) -> CfgMgrResult<String> {
        render_handlebars(&config_registry(true), name, source, context)
    }
}
