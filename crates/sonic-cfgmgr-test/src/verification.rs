//! Verification helpers for testing reconciliation workflows
//!
//! Provides assertion helpers to verify device files and command execution

use thiserror::Error;

use crate::MockAgent;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected command containing '{expected}', executed: {executed:?}")]
    CommandNotExecuted {
        expected: String,
        executed: Vec<String>,
    },

    #[error("Unexpected command containing '{unexpected}' was executed")]
    UnexpectedCommand { unexpected: String },

    #[error("Expected '{first}' to run before '{second}', executed: {executed:?}")]
    OrderMismatch {
        first: String,
        second: String,
        executed: Vec<String>,
    },

    #[error("Expected {expected} commands containing '{pattern}', found {actual}")]
    CommandCountMismatch {
        pattern: String,
        expected: usize,
        actual: usize,
    },

    #[error("Expected file '{path}' not found on device")]
    FileNotFound { path: String },

    #[error("File '{path}' should not exist on device")]
    UnexpectedFile { path: String },

    #[error("Content mismatch for {path}: expected {expected:?}, got {actual:?}")]
    ContentMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Command execution verifier
pub struct CommandVerifier {
    captured_commands: Vec<String>,
}

impl CommandVerifier {
    /// Create a new command verifier
    pub fn new(captured_commands: Vec<String>) -> Self {
        Self { captured_commands }
    }

    /// Verifier over everything an agent ran
    pub fn from_agent(agent: &MockAgent) -> Self {
        Self::new(agent.commands())
    }

    fn position(&self, pattern: &str) -> Option<usize> {
        self.captured_commands
            .iter()
            .position(|cmd| cmd.contains(pattern))
    }

    /// Verify that a command containing `expected` was executed
    pub fn assert_command_executed(&self, expected: &str) -> VerifyResult<()> {
        match self.position(expected) {
            Some(_) => Ok(()),
            None => Err(VerificationError::CommandNotExecuted {
                expected: expected.to_string(),
                executed: self.captured_commands.clone(),
            }),
        }
    }

    /// Verify that no command containing `unexpected` was executed
    pub fn assert_command_not_executed(&self, unexpected: &str) -> VerifyResult<()> {
        match self.position(unexpected) {
            Some(_) => Err(VerificationError::UnexpectedCommand {
                unexpected: unexpected.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Verify the first match of `first` precedes the first match of `second`
    pub fn assert_order(&self, first: &str, second: &str) -> VerifyResult<()> {
        self.assert_command_executed(first)?;
        self.assert_command_executed(second)?;

        match (self.position(first), self.position(second)) {
            (Some(a), Some(b)) if a < b => Ok(()),
            _ => Err(VerificationError::OrderMismatch {
                first: first.to_string(),
                second: second.to_string(),
                executed: self.captured_commands.clone(),
            }),
        }
    }

    /// Verify the number of commands containing `pattern`
    pub fn assert_command_count(&self, pattern: &str, expected: usize) -> VerifyResult<()> {
        let actual = self
            .captured_commands
            .iter()
            .filter(|cmd| cmd.contains(pattern))
            .count();

        if actual != expected {
            return Err(VerificationError::CommandCountMismatch {
                pattern: pattern.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Get all captured commands
    pub fn commands(&self) -> &[String] {
        &self.captured_commands
    }
}

/// Device file verifier
pub struct FileVerifier<'a> {
    agent: &'a MockAgent,
}

impl<'a> FileVerifier<'a> {
    /// Create a new file verifier
    pub fn new(agent: &'a MockAgent) -> Self {
        Self { agent }
    }

    /// Verify that a file exists with exactly `expected` as content
    pub fn assert_content(&self, path: &str, expected: &str) -> VerifyResult<()> {
        match self.agent.file(path) {
            None => Err(VerificationError::FileNotFound {
                path: path.to_string(),
            }),
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(VerificationError::ContentMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                actual,
            }),
        }
    }

    /// Verify that a file does not exist
    pub fn assert_absent(&self, path: &str) -> VerifyResult<()> {
        match self.agent.file(path) {
            Some(_) => Err(VerificationError::UnexpectedFile {
                path: path.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Verify that nothing is left under a staging directory
    pub fn assert_dir_empty(&self, dir: &str) -> VerifyResult<()> {
        match self.agent.paths().into_iter().find(|p| p.starts_with(dir)) {
            Some(path) => Err(VerificationError::UnexpectedFile { path }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> CommandVerifier {
        CommandVerifier::new(vec![
            "sudo vtysh --dryrun --inputfile \"/etc/sonic/tmp/.1_bgp.patch\"".to_string(),
            "sudo vtysh --inputfile \"/etc/sonic/tmp/.1_bgp.patch\"".to_string(),
            "sudo vtysh --writeconfig".to_string(),
        ])
    }

    #[test]
    fn test_command_executed() {
        let v = verifier();
        assert!(v.assert_command_executed("--writeconfig").is_ok());
        assert!(v.assert_command_executed("config reload").is_err());
        assert!(v.assert_command_not_executed("config reload").is_ok());
    }

    #[test]
    fn test_order() {
        let v = verifier();
        assert!(v.assert_order("--dryrun", "--writeconfig").is_ok());
        assert!(v.assert_order("--writeconfig", "--dryrun").is_err());
    }

    #[test]
    fn test_count() {
        let v = verifier();
        assert!(v.assert_command_count("--inputfile", 2).is_ok());
        assert!(v.assert_command_count("--inputfile", 1).is_err());
    }

    #[test]
    fn test_file_verifier() {
        let agent = MockAgent::new()
            .with_file("/etc/sonic/snmp.yml", "a: 1\n")
            .with_file("/etc/sonic/tmp/snmp.yml", "a: 2\n");
        let files = FileVerifier::new(&agent);

        assert!(files.assert_content("/etc/sonic/snmp.yml", "a: 1\n").is_ok());
        assert!(files.assert_content("/etc/sonic/snmp.yml", "a: 2\n").is_err());
        assert!(files.assert_absent("/etc/sonic/config_db.json").is_ok());
        assert!(files.assert_dir_empty("/etc/sonic/tmp/").is_err());
    }
}
