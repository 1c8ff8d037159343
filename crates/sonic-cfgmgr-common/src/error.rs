//! Error types for cfgmgr operations.
//!
//! This module defines the error types used throughout the cfgmgr crates.
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Template source could not be fetched or rendered.
    #[error("Template error for {template}: {message}")]
    Template {
        /// The template name as requested by the caller.
        template: String,
        /// Error message.
        message: String,
    },

    /// The device-side validator rejected a candidate configuration.
    #[error("Invalid {domain} configuration: {output}")]
    InvalidConfiguration {
        /// The configuration domain (bgp, snmp, config_db).
        domain: String,
        /// Raw validator output.
        output: String,
    },

    /// Applying a validated candidate failed.
    #[error("Unable to push {domain} configuration: {output}")]
    ApplyFailure {
        /// The configuration domain.
        domain: String,
        /// Output of the failed apply step.
        output: String,
    },

    /// Invalid setting in the daemon's own configuration.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that has invalid configuration.
        field: String,
        /// Error message describing the issue.
        message: String,
    },

    /// FRR has no session with the requested neighbor.
    #[error("No BGP session with {neighbor}")]
    NoBgpSession {
        /// The neighbor address as requested.
        neighbor: String,
    },

    /// Domain name is not one of the reconciled domains.
    #[error("Unsupported configuration domain '{name}'")]
    UnsupportedDomain {
        /// The rejected name.
        name: String,
    },

    /// File expected on the device does not exist.
    #[error("File {path} does not exist")]
    FileNotFound {
        /// Path on the device.
        path: String,
    },

    /// Content could not be parsed (YAML, JSON, command output).
    #[error("{path} cannot be loaded: {message}")]
    Parse {
        /// Path or command the content came from.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Local filesystem operation failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl CfgMgrError {
    /// Creates a template error.
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_configuration(domain: impl Into<String>, output: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            domain: domain.into(),
            output: output.into(),
        }
    }

    /// Creates an apply failure.
    pub fn apply_failure(domain: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ApplyFailure {
            domain: domain.into(),
            output: output.into(),
        }
    }

    /// Creates an invalid config error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error bound to a path.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error aborts a reconciliation workflow.
    ///
    /// Unsupported domains are recorded by the coordinator, never raised.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CfgMgrError::UnsupportedDomain { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CfgMgrError::file_not_found("/etc/sonic/snmp.yml");
        assert_eq!(err.to_string(), "File /etc/sonic/snmp.yml does not exist");
    }

    #[test]
    fn test_template_error() {
        let err = CfgMgrError::template("salt://sonic/bgp.j2", "Unable to get salt://sonic/bgp.j2");
        assert_eq!(
            err.to_string(),
            "Template error for salt://sonic/bgp.j2: Unable to get salt://sonic/bgp.j2"
        );
    }

    #[test]
    fn test_invalid_configuration_embeds_validator_output() {
        let err = CfgMgrError::invalid_configuration("bgp", "line 3: % Unknown command");
        assert_eq!(
            err.to_string(),
            "Invalid bgp configuration: line 3: % Unknown command"
        );
    }

    #[test]
    fn test_shell_command_failed() {
        let err = CfgMgrError::ShellCommandFailed {
            command: "sudo vtysh --inputfile /etc/sonic/tmp/.1_bgp.patch".to_string(),
            exit_code: 2,
            output: "% Unknown command".to_string(),
        };
        assert!(err.to_string().contains("vtysh --inputfile"));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_invalid_config() {
        let err = CfgMgrError::invalid_config("templates.root", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for templates.root: must not be empty"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(CfgMgrError::apply_failure("snmp", "cp: permission denied").is_fatal());
        assert!(CfgMgrError::template("t", "m").is_fatal());
        assert!(!CfgMgrError::UnsupportedDomain {
            name: "acl".to_string()
        }
        .is_fatal());
    }
}
