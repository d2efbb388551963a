//! Backend that spawns processes on this machine.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{CommandOutput, CommandSpec, ExecutionTarget};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs commands with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalBackend;

impl LocalBackend {
    /// Create a new LocalBackend.
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> Error {
    Error::Spawn {
        program: spec.program.clone(),
        source,
    }
}

impl Backend for LocalBackend {
    fn target(&self) -> ExecutionTarget {
        ExecutionTarget::Local
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("local: {spec}");
        let status = Self::command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(spec, e))?;

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            ..CommandOutput::default()
        })
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("local (capture): {spec}");
        let stdin = if spec.interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let output = Self::command(spec)
            .stdin(stdin)
            .output()
            .map_err(|e| spawn_error(spec, e))?;
        Ok(output.into())
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let dest = Path::new(remote);
        if local == dest {
            return Ok(());
        }
        log::debug!("local copy: {} -> {}", local.display(), remote);
        fs::copy(local, dest).map_err(|e| Error::Upload {
            local: local.to_path_buf(),
            target: ExecutionTarget::Local,
            remote: remote.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
