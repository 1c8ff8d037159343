//! Type definitions for confmgrd

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use sonic_cfgmgr_common::CfgMgrError;

/// Independently reconciled configuration subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// FRR routing configuration
    Bgp,
    /// SNMP agent configuration
    Snmp,
    /// CONFIG_DB startup file
    ConfigDb,
}

impl Domain {
    /// All reconciled domains
    pub const ALL: [Domain; 3] = [Domain::Bgp, Domain::Snmp, Domain::ConfigDb];

    /// Name used in requests and aggregate results
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Bgp => "bgp",
            Domain::Snmp => "snmp",
            Domain::ConfigDb => "config_db",
        }
    }

    /// Name used in operator-facing comments
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Bgp => "BGP",
            Domain::Snmp => "snmp",
            Domain::ConfigDb => "config_db",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CfgMgrError::UnsupportedDomain {
                name: s.to_string(),
            })
    }
}

/// Tri-state outcome of a reconciliation
///
/// Serialized as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Device is converged on the candidate
    Success,
    /// Apply was attempted and failed
    Failure,
    /// Dry-run, nothing enforced
    Unknown,
}

impl Outcome {
    /// Logical AND where `Unknown` does not participate.
    pub fn and(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Failure, _) | (_, Outcome::Failure) => Outcome::Failure,
            (Outcome::Unknown, o) | (o, Outcome::Unknown) => o,
            (Outcome::Success, Outcome::Success) => Outcome::Success,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Outcome::Success => Some(true),
            Outcome::Failure => Some(false),
            Outcome::Unknown => None,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_bool() {
            Some(b) => serializer.serialize_bool(b),
            None => serializer.serialize_none(),
        }
    }
}

/// Result of one per-domain reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub result: Outcome,
    pub dry_run: bool,
    /// Unified diff of the configuration before and after apply
    pub changes: Option<String>,
    pub comment: String,
}

impl ReconciliationResult {
    /// Result of a dry-run; never carries changes
    pub fn discarded(result: Outcome, comment: impl Into<String>) -> Self {
        Self {
            result,
            dry_run: true,
            changes: None,
            comment: comment.into(),
        }
    }

    /// Result of a real run; an empty diff is reported as no changes
    pub fn applied(result: Outcome, diff: String, comment: impl Into<String>) -> Self {
        Self {
            result,
            dry_run: false,
            changes: (!diff.is_empty()).then_some(diff),
            comment: comment.into(),
        }
    }
}

/// Reconciliation workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Rendered,
    Uploaded,
    Validated,
    Discarded,
    Applying,
    Applied,
    Failed,
    Cleaned,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Rendered => "rendered",
            WorkflowState::Uploaded => "uploaded",
            WorkflowState::Validated => "validated",
            WorkflowState::Discarded => "discarded",
            WorkflowState::Applying => "applying",
            WorkflowState::Applied => "applied",
            WorkflowState::Failed => "failed",
            WorkflowState::Cleaned => "cleaned",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
