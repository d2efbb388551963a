//! Remote execution settings.

use crate::types::ExecutionTarget;
use serde::{Deserialize, Serialize};

/// Default local port reserved for forwarding the remote engine socket.
pub const DEFAULT_TUNNEL_LOCAL_PORT: u16 = 22024;

/// Where commands go and how ssh is invoked.
///
/// Passed explicitly to every [`Dispatcher`](crate::Dispatcher); nothing here
/// is process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Remote hosts; empty means run everything locally
    pub hosts: Vec<String>,

    /// Let ssh/scp read `~/.ssh/config` (otherwise `-F /dev/null`)
    pub use_ssh_config: bool,

    /// Local port reserved for tunnelling to the remote engine
    pub tunnel_local_port: u16,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            use_ssh_config: true,
            tunnel_local_port: DEFAULT_TUNNEL_LOCAL_PORT,
        }
    }
}

impl DispatchConfig {
    /// Local-only configuration.
    pub fn local() -> Self {
        Self::default()
    }

    /// Configuration targeting the given hosts.
    pub fn with_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether commands run on this machine.
    pub fn runs_locally(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Targets a task runs against, in order.
    ///
    /// An empty host list yields a single local target; otherwise one remote
    /// target per host.
    pub fn targets(&self) -> Vec<ExecutionTarget> {
        if self.runs_locally() {
            vec![ExecutionTarget::Local]
        } else {
            self.hosts.iter().map(ExecutionTarget::remote).collect()
        }
    }
}
