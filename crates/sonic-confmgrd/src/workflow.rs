//! Reconciliation workflow
//!
//! One run renders a domain's template, stages it on the device as a
//! candidate file, validates it, then either discards it (dry-run) or
//! applies it, and finally removes the candidate:
//!
//! ```text
//! Idle -> Rendered -> Uploaded -> Validated -> Discarded ------------> Cleaned
//!                                          \-> Applying -> Applied -/
//!                                                       \-> Failed -/
//! ```
//!
//! The candidate is removed on every path once it has been staged,
//! including validation and apply errors.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sonic_cfgmgr_common::{unified_diff, CfgMgrError, CfgMgrResult, RemoteAgent, Templating};
use sonic_frr_diff::list_changed_objects;
use tracing::{debug, info, instrument, warn};

use crate::commands::build_mkdir_cmd;
use crate::paths::STAGING_DIR;
use crate::profile::{ApplyMode, DomainProfile, Validator};
use crate::readers;
use crate::types::{Domain, Outcome, ReconciliationResult, WorkflowState};

/// Parameters of one reconciliation run
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    /// Template name (optionally `salt://` prefixed)
    pub template: String,
    /// Template environment
    pub env: String,
    /// Rendering context
    pub context: Value,
    pub dry_run: bool,
    /// Skip the BGP push when no routing-policy object would change
    pub push_only_if_changes: bool,
    /// Reload every service after a CONFIG_DB apply
    pub reload: bool,
}

impl WorkflowRequest {
    /// Request rendering `template` from `env` against `context`
    pub fn new(template: impl Into<String>, env: impl Into<String>, context: Value) -> Self {
        Self {
            template: template.into(),
            env: env.into(),
            context,
            dry_run: false,
            push_only_if_changes: false,
            reload: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn push_only_if_changes(mut self, enabled: bool) -> Self {
        self.push_only_if_changes = enabled;
        self
    }

    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }
}

/// Reconciles one configuration domain
pub struct ReconcileWorkflow {
    profile: DomainProfile,
    agent: Arc<dyn RemoteAgent>,
    templating: Arc<dyn Templating>,
    state: WorkflowState,

    /// Testing support
    #[cfg(test)]
    history: Vec<WorkflowState>,
}

impl ReconcileWorkflow {
    /// Create a workflow for `domain` with its standard profile
    pub fn new(
        domain: Domain,
        agent: Arc<dyn RemoteAgent>,
        templating: Arc<dyn Templating>,
    ) -> Self {
        Self::with_profile(DomainProfile::for_domain(domain), agent, templating)
    }

    /// Create a workflow with an explicit profile
    pub fn with_profile(
        profile: DomainProfile,
        agent: Arc<dyn RemoteAgent>,
        templating: Arc<dyn Templating>,
    ) -> Self {
        Self {
            profile,
            agent,
            templating,
            state: WorkflowState::Idle,
            #[cfg(test)]
            history: Vec::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.profile.domain
    }

    pub fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    /// State reached by the last run
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    fn transition(&mut self, next: WorkflowState) {
        debug!(
            domain = %self.profile.domain,
            from = %self.state,
            to = %next,
            "Workflow state transition"
        );
        self.state = next;
        #[cfg(test)]
        self.history.push(next);
    }

    /// Runs the workflow to completion
    ///
    /// Template, validation and (for whole-file domains) apply failures
    /// are returned as errors. A failed BGP push is reported in the
    /// result instead.
    #[instrument(skip(self, request), fields(domain = %self.profile.domain, dry_run = request.dry_run))]
    pub async fn run(&mut self, request: &WorkflowRequest) -> CfgMgrResult<ReconciliationResult> {
        self.state = WorkflowState::Idle;
        #[cfg(test)]
        self.history.clear();

        let source = self
            .templating
            .fetch_source(&request.template, &request.env)
            .await?;
        let rendered = self
            .templating
            .render(&request.template, &source, &request.context)?;
        debug!("Configuration to push: {}", rendered);
        self.transition(WorkflowState::Rendered);

        self.agent.run_or_throw(&build_mkdir_cmd(STAGING_DIR)).await?;
        let candidate = self.profile.candidate_path(Utc::now());

        let outcome = self.reconcile(&candidate, &rendered, request).await;

        if let Err(e) = self.agent.remove_file(&candidate).await {
            warn!(path = %candidate, error = %e, "Failed to remove candidate");
        }
        self.transition(WorkflowState::Cleaned);

        match &outcome {
            Ok(result) => info!(
                result = ?result.result.as_bool(),
                changed = result.changes.is_some(),
                "Reconciliation finished"
            ),
            Err(e) => warn!(error = %e, "Reconciliation aborted"),
        }
        outcome
    }

    /// Everything between staging the candidate and cleanup
    async fn reconcile(
        &mut self,
        candidate: &str,
        rendered: &str,
        request: &WorkflowRequest,
    ) -> CfgMgrResult<ReconciliationResult> {
        self.agent.write_file(candidate, rendered).await?;
        self.transition(WorkflowState::Uploaded);

        self.validate(candidate, rendered).await?;
        self.transition(WorkflowState::Validated);

        if request.dry_run {
            let result = self.discard(rendered, request).await?;
            self.transition(WorkflowState::Discarded);
            return Ok(result);
        }

        self.apply(candidate, rendered, request).await
    }

    async fn validate(&self, candidate: &str, rendered: &str) -> CfgMgrResult<()> {
        let domain = self.profile.domain;

        match self.profile.validator {
            Validator::DeviceCommand => {
                let Some(cmd) = self.profile.validate_cmd(candidate) else {
                    return Err(CfgMgrError::internal(format!(
                        "No validation command for {domain}"
                    )));
                };
                let result = self.agent.run(&cmd).await?;
                if !result.success() {
                    return Err(CfgMgrError::invalid_configuration(
                        domain.as_str(),
                        result.combined_output(),
                    ));
                }
            }
            Validator::YamlSyntax => {
                serde_yaml::from_str::<serde_yaml::Value>(rendered).map_err(|e| {
                    CfgMgrError::invalid_configuration(domain.as_str(), e.to_string())
                })?;
            }
        }

        debug!(domain = %domain, "Candidate validated");
        Ok(())
    }

    /// Configuration the candidate is compared against
    async fn snapshot(&self) -> CfgMgrResult<String> {
        match self.profile.apply_mode {
            ApplyMode::MergeLines => readers::bgp_running_config(self.agent.as_ref()).await,
            ApplyMode::WholeFile => {
                readers::read_or_empty(self.agent.as_ref(), self.profile.live_path).await
            }
        }
    }

    /// Dry-run: report the would-be change, touch nothing
    async fn discard(
        &self,
        rendered: &str,
        request: &WorkflowRequest,
    ) -> CfgMgrResult<ReconciliationResult> {
        match self.profile.apply_mode {
            ApplyMode::MergeLines if request.push_only_if_changes => {
                let current = self.snapshot().await?;
                let report = list_changed_objects(&current, rendered);
                if report.is_empty() {
                    return Ok(ReconciliationResult::discarded(
                        Outcome::Success,
                        format!("- No changes detected in routing_policy:\n{rendered}"),
                    ));
                }
                Ok(ReconciliationResult::discarded(
                    Outcome::Unknown,
                    format!("- Configuration discarded:\n{rendered}\n- Changed objects: {report}"),
                ))
            }
            ApplyMode::MergeLines => Ok(ReconciliationResult::discarded(
                Outcome::Unknown,
                format!("- Configuration discarded:\n{rendered}"),
            )),
            ApplyMode::WholeFile => {
                let current = self.snapshot().await?;
                let changes = unified_diff(&current, rendered);
                let result = if self.profile.matches_live(&current, rendered) {
                    Outcome::Success
                } else {
                    Outcome::Unknown
                };
                Ok(ReconciliationResult::discarded(
                    result,
                    format!("- Configuration expected:\n{rendered}\n- Changes needed:\n{changes}"),
                ))
            }
        }
    }

    /// Reason to leave the device untouched, if any
    fn skip_reason(
        &self,
        before: &str,
        rendered: &str,
        request: &WorkflowRequest,
    ) -> Option<String> {
        match self.profile.apply_mode {
            ApplyMode::MergeLines if request.push_only_if_changes => {
                let report = list_changed_objects(before, rendered);
                report
                    .is_empty()
                    .then(|| format!("- No changes detected in routing_policy:\n{rendered}"))
            }
            ApplyMode::WholeFile if self.profile.skip_unchanged => self
                .profile
                .matches_live(before, rendered)
                .then(|| "- No change detected".to_string()),
            _ => None,
        }
    }

    async fn apply(
        &mut self,
        candidate: &str,
        rendered: &str,
        request: &WorkflowRequest,
    ) -> CfgMgrResult<ReconciliationResult> {
        let domain = self.profile.domain;
        let before = self.snapshot().await?;

        if let Some(comment) = self.skip_reason(&before, rendered, request) {
            info!(domain = %domain, "Device already converged, apply skipped");
            self.transition(WorkflowState::Applied);
            return Ok(ReconciliationResult::applied(
                Outcome::Success,
                String::new(),
                comment,
            ));
        }

        self.transition(WorkflowState::Applying);
        let mut failure = None;
        for cmd in self.profile.apply_cmds(candidate, request.reload) {
            let result = self.agent.run(&cmd).await?;
            if !result.success() {
                failure = Some(result.combined_output());
                break;
            }
        }

        if let Some(output) = &failure {
            if self.profile.apply_failure_is_fatal {
                self.transition(WorkflowState::Failed);
                return Err(CfgMgrError::apply_failure(domain.as_str(), output.clone()));
            }
        }

        match failure {
            Some(output) => {
                warn!(domain = %domain, output = %output, "Apply failed, reporting partial state");
                self.transition(WorkflowState::Failed);
                // The failure must still be reported when the device cannot
                // be read back
                let diff = match self.snapshot().await {
                    Ok(after) => unified_diff(&before, &after),
                    Err(e) => {
                        warn!(domain = %domain, error = %e, "Unable to read configuration after failed apply");
                        String::new()
                    }
                };
                Ok(ReconciliationResult::applied(
                    Outcome::Failure,
                    diff,
                    format!("- Unable to push {} configuration: {output}", domain.label()),
                ))
            }
            None => {
                let after = self.snapshot().await?;
                let diff = unified_diff(&before, &after);
                self.transition(WorkflowState::Applied);
                Ok(ReconciliationResult::applied(
                    Outcome::Success,
                    diff,
                    "- Configuration pushed and loaded",
                ))
            }
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }
}
