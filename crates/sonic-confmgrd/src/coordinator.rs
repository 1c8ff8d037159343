//! Multi-domain coordinator
//!
//! Runs one reconciliation workflow per requested domain, in request
//! order, and folds the per-domain results into one aggregate.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sonic_cfgmgr_common::{CfgMgrResult, RemoteAgent, Templating};
use tracing::{info, instrument, warn};

use crate::types::{Domain, Outcome};
use crate::workflow::{ReconcileWorkflow, WorkflowRequest};

/// Comment recorded for a domain name that is not reconciled
pub const UNSUPPORTED_COMMENT: &str = "unsupported";

/// What to reconcile across domains
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    /// `(domain name, template)` pairs in processing order
    pub templates: Vec<(String, String)>,
    /// Rendering context shared by every template
    pub context: Value,
    /// Template environment
    pub env: String,
    pub dry_run: bool,
    pub reload_on_config_db_change: bool,
    pub push_only_if_changes: bool,
}

impl ApplyRequest {
    pub fn new(env: impl Into<String>, context: Value) -> Self {
        Self {
            templates: Vec::new(),
            context,
            env: env.into(),
            dry_run: false,
            reload_on_config_db_change: false,
            push_only_if_changes: false,
        }
    }

    /// Add a domain to reconcile from `template`
    pub fn with_template(mut self, domain: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.push((domain.into(), template.into()));
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reload_on_config_db_change(mut self, reload: bool) -> Self {
        self.reload_on_config_db_change = reload;
        self
    }

    pub fn push_only_if_changes(mut self, enabled: bool) -> Self {
        self.push_only_if_changes = enabled;
        self
    }

    fn workflow_request(&self, template: &str) -> WorkflowRequest {
        WorkflowRequest::new(template, self.env.clone(), self.context.clone())
            .dry_run(self.dry_run)
            .push_only_if_changes(self.push_only_if_changes)
            .reload(self.reload_on_config_db_change)
    }
}

/// Combined result of a multi-domain run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub name: String,
    pub result: Outcome,
    /// Per-domain diff, keyed by domain name
    pub changes: BTreeMap<String, Option<String>>,
    /// `** <domain> **` labelled comments in processing order
    pub comment: Vec<String>,
}

impl AggregateResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            result: Outcome::Success,
            changes: BTreeMap::new(),
            comment: Vec::new(),
        }
    }

    fn record_comment(&mut self, domain: &str, comment: &str) {
        self.comment.push(format!("** {domain} **\n{comment}"));
    }
}

/// Runs workflows for several domains against one device
pub struct Coordinator {
    agent: Arc<dyn RemoteAgent>,
    templating: Arc<dyn Templating>,
}

impl Coordinator {
    pub fn new(agent: Arc<dyn RemoteAgent>, templating: Arc<dyn Templating>) -> Self {
        Self { agent, templating }
    }

    /// Reconciles every requested domain
    ///
    /// The first fatal domain error aborts the run and is returned;
    /// later domains are not attempted. Unsupported names are recorded
    /// and skipped. A dry-run always aggregates to `Unknown`.
    #[instrument(skip(self, request), fields(domains = request.templates.len(), dry_run = request.dry_run))]
    pub async fn apply(&self, name: &str, request: &ApplyRequest) -> CfgMgrResult<AggregateResult> {
        let mut aggregate = AggregateResult::new(name);

        for (section, template) in &request.templates {
            let domain: Domain = match section.parse() {
                Ok(domain) => domain,
                Err(e) => {
                    warn!("{}", e);
                    aggregate.record_comment(section, UNSUPPORTED_COMMENT);
                    continue;
                }
            };

            let mut workflow =
                ReconcileWorkflow::new(domain, self.agent.clone(), self.templating.clone());
            let result = workflow.run(&request.workflow_request(template)).await?;

            aggregate.record_comment(section, &result.comment);
            aggregate.changes.insert(section.clone(), result.changes);
            aggregate.result = aggregate.result.and(result.result);
        }

        if request.dry_run {
            aggregate.result = Outcome::Unknown;
        }

        info!(
            name = %name,
            result = ?aggregate.result.as_bool(),
            "Configuration reconciled"
        );
        Ok(aggregate)
    }
}
