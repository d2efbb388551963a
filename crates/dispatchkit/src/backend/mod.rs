//! Backend abstraction for command execution.
//!
//! The [`Backend`] trait is the seam between deciding *what* to run and
//! actually spawning processes:
//! - [`local::LocalBackend`] spawns on this machine
//! - [`ssh::SshBackend`] runs through `ssh`/`scp`
//! - [`recording::RecordingBackend`] records calls and replays scripted output

pub mod local;
pub mod recording;
pub mod ssh;

use crate::error::Result;
use crate::types::{CommandOutput, CommandSpec, ExecutionTarget};
use std::path::Path;

/// Executes commands on one target.
pub trait Backend: Send + Sync {
    /// The target this backend executes on.
    fn target(&self) -> ExecutionTarget;

    /// Run a command with inherited stdio (output streams to the terminal).
    ///
    /// The returned output carries the exit status only.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command and capture stdout/stderr.
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Copy a local file to `remote` on the target.
    fn upload(&self, local: &Path, remote: &str) -> Result<()>;
}
