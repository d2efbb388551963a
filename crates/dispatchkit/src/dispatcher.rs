//! Local/remote command dispatch.

use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::backend::ssh::SshBackend;
use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::types::{CommandOutput, CommandSpec, ExecutionTarget, OnFailure};
use std::path::Path;

/// Sends commands to one execution target.
///
/// Commands run locally iff the target is [`ExecutionTarget::Local`]; a
/// remote target routes every dispatched command through its remote backend.
/// The local backend stays available for work that always happens on this
/// machine ([`Dispatcher::run_local`]).
pub struct Dispatcher {
    target: ExecutionTarget,
    local: Box<dyn Backend>,
    remote: Option<Box<dyn Backend>>,
}

impl Dispatcher {
    /// Create a dispatcher for `target` with the real backends.
    pub fn new(target: ExecutionTarget, config: &DispatchConfig) -> Self {
        let remote: Option<Box<dyn Backend>> = match &target {
            ExecutionTarget::Local => None,
            ExecutionTarget::Remote { host } => {
                log::debug!(
                    "remote target {host} (ssh config: {}, tunnel port: {})",
                    config.use_ssh_config,
                    config.tunnel_local_port
                );
                Some(Box::new(SshBackend::new(host, config)))
            }
        };
        Self {
            target,
            local: Box::new(LocalBackend::new()),
            remote,
        }
    }

    /// One dispatcher per configured target, in order.
    pub fn for_config(config: &DispatchConfig) -> Vec<Self> {
        config
            .targets()
            .into_iter()
            .map(|target| Self::new(target, config))
            .collect()
    }

    /// Create a dispatcher with custom backends (useful for testing).
    ///
    /// `remote` is ignored for a local target.
    pub fn with_backends(
        target: ExecutionTarget,
        local: Box<dyn Backend>,
        remote: Option<Box<dyn Backend>>,
    ) -> Self {
        let remote = if target.is_local() { None } else { remote };
        Self {
            target,
            local,
            remote,
        }
    }

    /// The target dispatched commands run on.
    pub fn target(&self) -> &ExecutionTarget {
        &self.target
    }

    /// Whether dispatched commands run on this machine.
    pub fn is_local(&self) -> bool {
        self.remote.is_none()
    }

    fn backend(&self) -> &dyn Backend {
        self.remote.as_deref().unwrap_or(self.local.as_ref())
    }

    /// Run a command on the target, streaming its output. Non-zero exit is fatal.
    pub fn run(&self, spec: &CommandSpec) -> Result<()> {
        self.run_with(spec, OnFailure::Abort).map(|_| ())
    }

    /// Run a command on the target with an explicit failure policy.
    ///
    /// With [`OnFailure::Warn`] the output is captured instead of streamed,
    /// and a failure is logged and returned as `Ok(false)`.
    pub fn run_with(&self, spec: &CommandSpec, on_failure: OnFailure) -> Result<bool> {
        let backend = self.backend();
        match on_failure {
            OnFailure::Abort => {
                let output = backend.run(spec)?;
                check(&backend.target(), spec, output).map(|_| true)
            }
            OnFailure::Warn => {
                let output = backend.capture(spec)?;
                if !output.success {
                    log::warn!(
                        "[{}] ignoring failure of `{spec}`: {}",
                        backend.target(),
                        output.stderr_str().trim()
                    );
                }
                Ok(output.success)
            }
        }
    }

    /// Run a command on the target and return its trimmed stdout. Non-zero exit is fatal.
    pub fn capture(&self, spec: &CommandSpec) -> Result<String> {
        let backend = self.backend();
        let output = check(&backend.target(), spec, backend.capture(spec)?)?;
        Ok(output.stdout_str().trim().to_string())
    }

    /// Run a command on this machine regardless of the target.
    pub fn run_local(&self, spec: &CommandSpec) -> Result<()> {
        let output = self.local.run(spec)?;
        check(&ExecutionTarget::Local, spec, output).map(|_| ())
    }

    /// Copy a local file to `remote` on the target.
    pub fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        self.backend().upload(local, remote)
    }
}

fn check(target: &ExecutionTarget, spec: &CommandSpec, output: CommandOutput) -> Result<CommandOutput> {
    if output.success {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            target: target.clone(),
            command: spec.to_shell_line(),
            code: output.code,
            stderr: output.stderr_str().trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingBackend;

    fn local() -> (Dispatcher, RecordingBackend, RecordingBackend) {
        let l = RecordingBackend::new(ExecutionTarget::Local);
        let r = RecordingBackend::new(ExecutionTarget::remote("otp1"));
        let d = Dispatcher::with_backends(
            ExecutionTarget::Local,
            Box::new(l.clone()),
            Some(Box::new(r.clone())),
        );
        (d, l, r)
    }

    fn remote() -> (Dispatcher, RecordingBackend, RecordingBackend) {
        let l = RecordingBackend::new(ExecutionTarget::Local);
        let r = RecordingBackend::new(ExecutionTarget::remote("otp1"));
        let d = Dispatcher::with_backends(
            ExecutionTarget::remote("otp1"),
            Box::new(l.clone()),
            Some(Box::new(r.clone())),
        );
        (d, l, r)
    }

    #[test]
    fn test_local_target_uses_local_backend() {
        let (d, l, r) = local();
        assert!(d.is_local());
        d.run(&CommandSpec::new("docker").arg("ps")).unwrap();
        d.capture(&CommandSpec::new("docker").arg("images")).unwrap();

        assert_eq!(l.calls().len(), 2);
        assert!(r.calls().is_empty());
    }

    #[test]
    fn test_remote_target_uses_remote_backend() {
        let (d, l, r) = remote();
        assert!(!d.is_local());
        d.run(&CommandSpec::new("docker").arg("ps")).unwrap();
        d.upload(Path::new("/tmp/a.tgz"), "/tmp/a.tgz").unwrap();

        assert!(l.calls().is_empty());
        assert_eq!(r.calls().len(), 2);
        assert!(r.calls().iter().all(|c| c.target == ExecutionTarget::remote("otp1")));
    }

    #[test]
    fn test_run_local_ignores_target() {
        let (d, l, r) = remote();
        d.run_local(&CommandSpec::new("tar").arg("--version")).unwrap();
        assert_eq!(l.calls().len(), 1);
        assert!(r.calls().is_empty());
    }

    #[test]
    fn test_failure_is_fatal() {
        let (d, l, _) = local();
        l.fail(&["docker", "restart"], 1);
        let err = d
            .run(&CommandSpec::new("docker").args(["restart", "otpserver"]))
            .unwrap_err();
        match err {
            Error::CommandFailed { target, command, code, .. } => {
                assert_eq!(target, ExecutionTarget::Local);
                assert_eq!(command, "docker restart otpserver");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_warn_only_swallows_failure() {
        let (d, l, _) = local();
        l.fail(&["docker", "rm"], 1);
        let ok = d
            .run_with(&CommandSpec::new("docker").args(["rm", "-f", "otpserver"]), OnFailure::Warn)
            .unwrap();
        assert!(!ok);
        assert_eq!(l.calls()[0].kind, crate::backend::recording::CallKind::Capture);
    }

    #[test]
    fn test_capture_trims() {
        let (d, l, _) = local();
        l.respond(&["docker", "inspect"], CommandOutput::ok("  4242\n"));
        let pid = d
            .capture(&CommandSpec::new("docker").args(["inspect", "otpserver"]))
            .unwrap();
        assert_eq!(pid, "4242");
    }

    #[test]
    fn test_capture_failure_keeps_stderr() {
        let (d, _, r) = remote();
        r.respond(&["docker"], CommandOutput::failed(1, "Error: No such object: x\n"));
        let err = d.capture(&CommandSpec::new("docker").args(["inspect", "x"])).unwrap_err();
        match err {
            Error::CommandFailed { stderr, target, .. } => {
                assert_eq!(stderr, "Error: No such object: x");
                assert_eq!(target, ExecutionTarget::remote("otp1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_remote_ignored_for_local_target() {
        let (d, _, _) = local();
        assert_eq!(d.target(), &ExecutionTarget::Local);
        assert!(d.is_local());
    }

    #[test]
    fn test_for_config_one_per_host() {
        let dispatchers = Dispatcher::for_config(&DispatchConfig::with_hosts(["a", "b"]));
        let targets: Vec<_> = dispatchers.iter().map(|d| d.target().clone()).collect();
        assert_eq!(targets, vec![ExecutionTarget::remote("a"), ExecutionTarget::remote("b")]);

        let dispatchers = Dispatcher::for_config(&DispatchConfig::local());
        assert_eq!(dispatchers.len(), 1);
        assert!(dispatchers[0].is_local());
    }
}
