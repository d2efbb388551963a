//! Shared test fixtures.

use dispatchkit::backend::recording::RecordingBackend;
use dispatchkit::{Dispatcher, ExecutionTarget};

use crate::config::AppConfig;

/// Remote host used by fixtures
pub const REMOTE_HOST: &str = "deploy@otp1";

/// Defaults with the startup waits disabled.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.deploy.startup_wait_secs = 0;
    config
}

/// A dispatcher wired to recording backends.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub local: RecordingBackend,
    pub remote: RecordingBackend,
}

impl Harness {
    pub fn local() -> Self {
        Self::new(ExecutionTarget::Local)
    }

    pub fn remote() -> Self {
        Self::new(ExecutionTarget::remote(REMOTE_HOST))
    }

    fn new(target: ExecutionTarget) -> Self {
        let local = RecordingBackend::new(ExecutionTarget::Local);
        let remote = RecordingBackend::new(ExecutionTarget::remote(REMOTE_HOST));
        let dispatcher = Dispatcher::with_backends(
            target,
            Box::new(local.clone()),
            Some(Box::new(remote.clone())),
        );
        Self {
            dispatcher,
            local,
            remote,
        }
    }
}
