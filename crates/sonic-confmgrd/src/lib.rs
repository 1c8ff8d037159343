//! Declarative configuration reconciliation for SONiC switches.
//!
//! This crate implements `confmgrd`, which drives a switch toward
//! configuration rendered from templates. Each configuration domain is
//! reconciled by the same workflow: render, stage a candidate file,
//! validate it on the device, then apply it (or discard it on dry-run)
//! and remove the candidate.
//!
//! # Domains
//!
//! | Domain | Live file | Validator | Apply |
//! |--------|-----------|-----------|-------|
//! | bgp | /etc/sonic/frr/frr.conf | `vtysh --dryrun` | `vtysh --inputfile`, `--writeconfig` |
//! | snmp | /etc/sonic/snmp.yml | YAML syntax | copy, restart snmp.service |
//! | config_db | /etc/sonic/config_db.json | `sonic-cfggen -j` | copy, optional `config reload` |
//!
//! BGP pushes can be gated on routing-policy changes detected by
//! [`sonic_frr_diff`].
//!
//! # Example
//!
//! ```ignore
//! use sonic_confmgrd::{ApplyRequest, Coordinator};
//!
//! let coordinator = Coordinator::new(agent, templating);
//! let request = ApplyRequest::new("base", context)
//!     .with_template("bgp", "salt://sonic/frr.conf")
//!     .push_only_if_changes(true);
//! let aggregate = coordinator.apply("tor1", &request).await?;
//! ```

pub mod bgp_neighbors;
pub mod commands;
pub mod config_file;
mod coordinator;
pub mod paths;
pub mod profile;
pub mod readers;
mod types;
mod workflow;

pub use bgp_neighbors::{BgpNeighbor, SessionState};
pub use config_file::ConfmgrConfig;
pub use coordinator::{AggregateResult, ApplyRequest, Coordinator, UNSUPPORTED_COMMENT};
pub use profile::{ApplyMode, Comparison, DomainProfile, Validator};
pub use types::*;
pub use workflow::{ReconcileWorkflow, WorkflowRequest};
