//! Backend that runs commands on a remote host through `ssh` and `scp`.

use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::types::{CommandOutput, CommandSpec, ExecutionTarget};
use std::path::Path;

/// Executes on one remote host.
///
/// The remote command is sent as a single quoted shell line so the remote
/// shell sees exactly the argument list of the [`CommandSpec`].
#[derive(Debug, Clone)]
pub struct SshBackend {
    host: String,
    use_ssh_config: bool,
    local: LocalBackend,
}

impl SshBackend {
    /// Create a backend for `host` using the ssh settings from `config`.
    pub fn new(host: impl Into<String>, config: &DispatchConfig) -> Self {
        Self {
            host: host.into(),
            use_ssh_config: config.use_ssh_config,
            local: LocalBackend::new(),
        }
    }

    fn config_args(&self) -> Vec<String> {
        if self.use_ssh_config {
            Vec::new()
        } else {
            vec!["-F".to_string(), "/dev/null".to_string()]
        }
    }

    /// The local `ssh` invocation that runs `spec` on the host.
    pub fn ssh_command(&self, spec: &CommandSpec) -> CommandSpec {
        let mut ssh = CommandSpec::new("ssh").args(self.config_args());
        if spec.interactive {
            ssh = ssh.arg("-t").interactive();
        }
        ssh.arg(&self.host).arg(spec.to_shell_line())
    }

    /// The local `scp` invocation that copies `local` to `remote` on the host.
    pub fn scp_command(&self, local: &Path, remote: &str) -> CommandSpec {
        CommandSpec::new("scp")
            .args(self.config_args())
            .arg("-q")
            .arg(local.to_string_lossy())
            .arg(format!("{}:{}", self.host, remote))
    }
}

impl Backend for SshBackend {
    fn target(&self) -> ExecutionTarget {
        ExecutionTarget::remote(&self.host)
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("[{}] run: {spec}", self.host);
        self.local.run(&self.ssh_command(spec))
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("[{}] capture: {spec}", self.host);
        self.local.capture(&self.ssh_command(spec))
    }

    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        log::debug!("[{}] put: {} -> {}", self.host, local.display(), remote);
        let output = self.local.capture(&self.scp_command(local, remote))?;
        if output.success {
            Ok(())
        } else {
            Err(Error::Upload {
                local: local.to_path_buf(),
                target: self.target(),
                remote: remote.to_string(),
                message: output.stderr_str().trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(use_ssh_config: bool) -> SshBackend {
        let config = DispatchConfig {
            use_ssh_config,
            ..DispatchConfig::with_hosts(["deploy@otp1"])
        };
        SshBackend::new("deploy@otp1", &config)
    }

    #[test]
    fn test_ssh_command_quotes_remote_line() {
        let spec = CommandSpec::new("docker")
            .args(["run", "--volumes-from", "otpserver", "opentripplanner:builder"])
            .args(["-u", "a.zip b.zip", "-e", ""]);
        let ssh = backend(true).ssh_command(&spec);

        assert_eq!(ssh.program, "ssh");
        assert_eq!(
            ssh.args,
            vec![
                "deploy@otp1".to_string(),
                "docker run --volumes-from otpserver opentripplanner:builder -u \"a.zip b.zip\" -e \"\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_ssh_command_without_user_config() {
        let ssh = backend(false).ssh_command(&CommandSpec::new("docker").arg("ps"));
        assert_eq!(ssh.args, vec!["-F", "/dev/null", "deploy@otp1", "docker ps"]);
    }

    #[test]
    fn test_interactive_allocates_tty() {
        let spec = CommandSpec::new("nsenter").args(["--target", "4242", "--mount"]).interactive();
        let ssh = backend(true).ssh_command(&spec);
        assert!(ssh.interactive);
        assert_eq!(ssh.args[0], "-t");
        assert_eq!(ssh.args[1], "deploy@otp1");
    }

    #[test]
    fn test_working_dir_prefix() {
        let spec = CommandSpec::new("docker")
            .args(["build", "-t", "opentripplanner:server", "server"])
            .current_dir("./otp-dockerdeploy");
        let ssh = backend(true).ssh_command(&spec);
        assert_eq!(
            ssh.args.last().unwrap(),
            "cd ./otp-dockerdeploy && docker build -t opentripplanner:server server"
        );
        // cwd applies remotely, not to the local ssh process
        assert!(ssh.current_dir.is_none());
    }

    #[test]
    fn test_scp_command() {
        let scp = backend(false).scp_command(Path::new("/tmp/otp-dockerdeploy.tgz"), "/tmp/otp-dockerdeploy.tgz");
        assert_eq!(
            scp.argv(),
            vec![
                "scp",
                "-F",
                "/dev/null",
                "-q",
                "/tmp/otp-dockerdeploy.tgz",
                "deploy@otp1:/tmp/otp-dockerdeploy.tgz"
            ]
        );
    }

    #[test]
    fn test_target() {
        assert_eq!(backend(true).target(), ExecutionTarget::remote("deploy@otp1"));
    }
}
