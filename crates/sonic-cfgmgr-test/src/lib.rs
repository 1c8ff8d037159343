//! Test infrastructure for SONiC configuration reconciliation
//!
//! Provides:
//! - An in-memory remote agent with scripted command responses
//! - An in-memory templating collaborator
//! - Device configuration fixtures (FRR, SNMP, CONFIG_DB)
//! - Command and file verification helpers

pub mod fixtures;
mod mock_agent;
mod mock_templating;
mod verification;

pub use mock_agent::{Effect, MockAgent};
pub use mock_templating::MemoryTemplating;
pub use verification::*;
