//! Common infrastructure for SONiC configuration managers.
//!
//! This crate provides the shared building blocks used to reconcile
//! declarative switch configuration (FRR, SNMP, CONFIG_DB):
//!
//! - [`shell`]: Safe shell command execution with proper quoting
//! - [`agent`]: The [`RemoteAgent`] collaborator (commands + file transfer)
//! - [`template`]: The [`Templating`] collaborator (fetch + render)
//! - [`diff`]: Unified diffs between configuration snapshots
//! - [`error`]: Error types for cfgmgr operations
//!
//! # Example
//!
//! ```ignore
//! use sonic_cfgmgr_common::{LocalAgent, RemoteAgent, shell::shellquote};
//!
//! async fn check(agent: &dyn RemoteAgent, path: &str) -> CfgMgrResult<bool> {
//!     let cmd = format!("sudo sonic-cfggen -j {}", shellquote(path));
//!     Ok(agent.run(&cmd).await?.success())
//! }
//! ```

pub mod agent;
pub mod diff;
pub mod error;
pub mod shell;
pub mod template;

// Re-export commonly used items at crate root
pub use agent::{LocalAgent, RemoteAgent};
pub use diff::unified_diff;
pub use error::{CfgMgrError, CfgMgrResult};
pub use shell::ExecResult;
pub use template::{FileTemplating, Templating};
