//! In-memory remote agent
//!
//! Stands in for a switch: files live in a map, commands are answered
//! from scripted rules, and everything the workflow does is captured for
//! later verification.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sonic_cfgmgr_common::shell::CP_CMD;
use sonic_cfgmgr_common::{CfgMgrError, CfgMgrResult, ExecResult, RemoteAgent};
use tracing::debug;

/// Double-quoted argument as produced by `shellquote`.
static QUOTED_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("Invalid regex pattern"));

/// Side effect applied to the in-memory files when a command succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Copy one file over another.
    CopyFile { from: String, to: String },
    /// Replace a file's content.
    WriteFile { path: String, content: String },
    /// Delete a file.
    RemoveFile { path: String },
}

/// Scripted answer for every command containing `needle`.
#[derive(Debug)]
struct CommandRule {
    needle: String,
    responses: Vec<ExecResult>,
    effects: Vec<Effect>,
    hits: usize,
}

impl CommandRule {
    /// Next response; the last one repeats once the sequence is exhausted.
    fn next_response(&mut self) -> ExecResult {
        let idx = self.hits.min(self.responses.len().saturating_sub(1));
        self.hits += 1;
        self.responses.get(idx).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct AgentState {
    files: BTreeMap<String, String>,
    rules: Vec<CommandRule>,
    commands: Vec<String>,
    written: Vec<String>,
    removed: Vec<String>,
    emulate_copy: bool,
}

impl AgentState {
    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::CopyFile { from, to } => {
                if let Some(content) = self.files.get(from).cloned() {
                    self.files.insert(to.clone(), content);
                }
            }
            Effect::WriteFile { path, content } => {
                self.files.insert(path.clone(), content.clone());
            }
            Effect::RemoveFile { path } => {
                self.files.remove(path);
            }
        }
    }

    /// Emulates `cp "<from>" "<to>"` from the last two quoted arguments.
    fn emulate_cp(&mut self, command: &str) {
        let args: Vec<String> = QUOTED_ARG_RE
            .captures_iter(command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().replace("\\\"", "\""))
            .collect();

        if let [.., from, to] = args.as_slice() {
            let effect = Effect::CopyFile {
                from: from.clone(),
                to: to.clone(),
            };
            self.apply(&effect);
        }
    }
}

/// Remote agent backed by memory.
///
/// Commands with no matching rule succeed with empty output.
#[derive(Debug, Default)]
pub struct MockAgent {
    state: Mutex<AgentState>,
}

impl MockAgent {
    /// Create an agent with no files and no rules
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().expect("mock agent state poisoned")
    }

    /// Seed a file
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.state().files.insert(path.into(), content.into());
        self
    }

    /// Answer commands containing `needle` with `response`
    pub fn on_command(self, needle: impl Into<String>, response: ExecResult) -> Self {
        self.on_command_sequence(needle, vec![response])
    }

    /// Answer successive commands containing `needle` from `responses`
    pub fn on_command_sequence(self, needle: impl Into<String>, responses: Vec<ExecResult>) -> Self {
        self.add_rule(needle.into(), responses, Vec::new());
        self
    }

    /// Answer with `response` and apply `effect` when the response succeeds
    pub fn on_command_with_effect(
        self,
        needle: impl Into<String>,
        response: ExecResult,
        effect: Effect,
    ) -> Self {
        self.add_rule(needle.into(), vec![response], vec![effect]);
        self
    }

    /// Make successful `cp` commands copy files between their quoted paths
    pub fn with_copy_emulation(self) -> Self {
        self.state().emulate_copy = true;
        self
    }

    fn add_rule(&self, needle: String, responses: Vec<ExecResult>, effects: Vec<Effect>) {
        self.state().rules.push(CommandRule {
            needle,
            responses,
            effects,
            hits: 0,
        });
    }

    /// Current content of a file
    pub fn file(&self, path: &str) -> Option<String> {
        self.state().files.get(path).cloned()
    }

    /// Paths of every file currently present
    pub fn paths(&self) -> Vec<String> {
        self.state().files.keys().cloned().collect()
    }

    /// Commands run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    /// Paths written so far, in order
    pub fn written_paths(&self) -> Vec<String> {
        self.state().written.clone()
    }

    /// Paths removed so far, in order
    pub fn removed_paths(&self) -> Vec<String> {
        self.state().removed.clone()
    }
}

#[async_trait]
impl RemoteAgent for MockAgent {
    async fn run(&self, command: &str) -> CfgMgrResult<ExecResult> {
        let mut state = self.state();
        state.commands.push(command.to_string());

        let (response, effects) = match state
            .rules
            .iter_mut()
            .find(|rule| command.contains(&rule.needle))
        {
            Some(rule) => (rule.next_response(), rule.effects.clone()),
            None => (ExecResult::default(), Vec::new()),
        };

        if response.success() {
            for effect in &effects {
                state.apply(effect);
            }
            if state.emulate_copy && command.contains(CP_CMD) {
                state.emulate_cp(command);
            }
        }

        debug!(command = %command, exit_code = response.exit_code, "Mock command");
        Ok(response)
    }

    async fn write_file(&self, path: &str, content: &str) -> CfgMgrResult<()> {
        let mut state = self.state();
        state.written.push(path.to_string());
        state.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn read_file(&self, path: &str) -> CfgMgrResult<String> {
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| CfgMgrError::file_not_found(path))
    }

    async fn remove_file(&self, path: &str) -> CfgMgrResult<()> {
        let mut state = self.state();
        state.removed.push(path.to_string());
        state.files.remove(path);
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> CfgMgrResult<bool> {
        Ok(self.state().files.contains_key(path))
    }
}
