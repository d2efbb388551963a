//! # dispatchkit
//!
//! Run typed commands on the local machine or on a remote host over ssh.
//!
//! The execution target is decided by configuration alone: an empty host list
//! means everything runs locally, otherwise each host becomes a remote target
//! and every dispatched command goes through `ssh` to it.
//!
//! ## Example
//!
//! ```no_run
//! use dispatchkit::{CommandSpec, DispatchConfig, Dispatcher, OnFailure};
//!
//! let config = DispatchConfig::with_hosts(["deploy@otp1"]);
//! for dispatcher in Dispatcher::for_config(&config) {
//!     // Tolerate a missing container, abort on anything else.
//!     dispatcher
//!         .run_with(&CommandSpec::new("docker").args(["rm", "-f", "otpserver"]), OnFailure::Warn)
//!         .unwrap();
//!     dispatcher.run(&CommandSpec::new("docker").arg("ps")).unwrap();
//! }
//! ```
//!
//! ## Testing
//!
//! [`backend::recording::RecordingBackend`] records every call and replays
//! scripted outputs, so callers can assert on the exact command sequence
//! without a container engine or ssh access.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod types;

pub use backend::Backend;
pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use types::{CommandOutput, CommandSpec, ExecutionTarget, OnFailure, shell_quote};
