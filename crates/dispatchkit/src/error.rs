//! Error types for dispatched commands.
//!
//! A dispatched command either could not be started at all ([`Error::Spawn`]),
//! or it ran and exited non-zero ([`Error::CommandFailed`]). Callers that
//! tolerate failure use [`OnFailure::Warn`](crate::OnFailure::Warn) instead of
//! matching on these.

use crate::types::ExecutionTarget;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while dispatching commands.
#[derive(Debug, Error)]
pub enum Error {
    /// The command ran and exited with a non-zero status
    #[error("command failed on {target}: {command} (exit code {})", display_code(.code))]
    CommandFailed {
        /// Where the command ran
        target: ExecutionTarget,
        /// Display form of the command line
        command: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Standard error output (empty for streamed commands)
        stderr: String,
    },

    /// The program could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Copying a file to the target failed
    #[error("failed to upload {} to {target}:{remote}: {message}", .local.display())]
    Upload {
        /// Local source file
        local: PathBuf,
        /// Destination target
        target: ExecutionTarget,
        /// Destination path on the target
        remote: String,
        /// Details about the failure
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error comes from the command's own exit status rather
    /// than from the machinery around it.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;
