//! Backend that records every call instead of spawning processes.
//!
//! Useful for asserting which commands a task issues, in which order and on
//! which target, without a container engine or ssh. Responses are scripted by
//! argv prefix; anything unscripted succeeds with empty output.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{CommandOutput, CommandSpec, ExecutionTarget};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// How a recorded command was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    /// [`Backend::run`]
    Run,
    /// [`Backend::capture`]
    Capture,
    /// [`Backend::upload`]
    Upload {
        /// Source file
        local: PathBuf,
        /// Destination path
        remote: String,
    },
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Target of the backend that recorded the call
    pub target: ExecutionTarget,
    /// Invocation style
    pub kind: CallKind,
    /// The command (empty `upload` pseudo-command for uploads)
    pub spec: CommandSpec,
}

impl Call {
    /// Display form of the command line.
    pub fn line(&self) -> String {
        self.spec.to_shell_line()
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    responses: Vec<(Vec<String>, CommandOutput)>,
}

/// Records calls; clones share the same log.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    target: ExecutionTarget,
    state: Arc<Mutex<State>>,
}

impl RecordingBackend {
    /// Create a recorder for the given target.
    pub fn new(target: ExecutionTarget) -> Self {
        Self {
            target,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the calls recorded so far.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Reply with `output` to commands whose argv starts with `prefix`.
    ///
    /// Later registrations win over earlier ones.
    pub fn respond(&self, prefix: &[&str], output: CommandOutput) -> &Self {
        self.lock()
            .responses
            .push((prefix.iter().map(|s| (*s).to_string()).collect(), output));
        self
    }

    /// Make commands starting with `prefix` exit with `code`.
    pub fn fail(&self, prefix: &[&str], code: i32) -> &Self {
        self.respond(prefix, CommandOutput::failed(code, "scripted failure"))
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Command lines recorded so far (uploads excluded).
    pub fn lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| !matches!(c.kind, CallKind::Upload { .. }))
            .map(Call::line)
            .collect()
    }

    /// Index of the first recorded command starting with `prefix`.
    pub fn position(&self, prefix: &[&str]) -> Option<usize> {
        self.calls().iter().position(|c| c.spec.starts_with(prefix))
    }

    fn record(&self, kind: CallKind, spec: &CommandSpec) -> CommandOutput {
        let mut state = self.lock();
        state.calls.push(Call {
            target: self.target.clone(),
            kind,
            spec: spec.clone(),
        });
        state
            .responses
            .iter()
            .rev()
            .find(|(prefix, _)| {
                let prefix: Vec<&str> = prefix.iter().map(String::as_str).collect();
                spec.starts_with(&prefix)
            })
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

impl Backend for RecordingBackend {
    fn target(&self) -> ExecutionTarget {
        self.target.clone()
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let mut output = self.record(CallKind::Run, spec);
        output.stdout.clear();
        output.stderr.clear();
        Ok(output)
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        Ok(self.record(CallKind::Capture, spec))
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let spec = CommandSpec::new("upload").arg(local.to_string_lossy()).arg(remote);
        let output = self.record(
            CallKind::Upload {
                local: local.to_path_buf(),
                remote: remote.to_string(),
            },
            &spec,
        );
        if output.success {
            Ok(())
        } else {
            Err(Error::Upload {
                local: local.to_path_buf(),
                target: self.target.clone(),
                remote: remote.to_string(),
                message: output.stderr_str(),
            })
        }
    }
}
