//! Core types: where a command runs, what it is, and what it produced.

use std::fmt;
use std::process::Output;

// ============================================================================
// ExecutionTarget
// ============================================================================

/// Where a dispatched command executes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionTarget {
    /// The machine running this process
    Local,
    /// A remote host reached over ssh (`host`, `user@host` or an ssh config alias)
    Remote {
        /// Host as given in the host list
        host: String,
    },
}

impl ExecutionTarget {
    /// Create a remote target.
    pub fn remote(host: impl Into<String>) -> Self {
        Self::Remote { host: host.into() }
    }

    /// Whether this is the local machine.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    /// Hostname suitable for building a URL (`localhost` for local targets,
    /// the host without any `user@` prefix for remote ones).
    pub fn hostname(&self) -> &str {
        match self {
            Self::Local => "localhost",
            Self::Remote { host } => host.rsplit_once('@').map_or(host.as_str(), |(_, h)| h),
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote { host } => write!(f, "{host}"),
        }
    }
}

// ============================================================================
// OnFailure
// ============================================================================

/// What to do when a command exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Return an error and stop
    #[default]
    Abort,
    /// Log a warning and carry on
    Warn,
}

// ============================================================================
// CommandSpec
// ============================================================================

/// A command as a program plus an explicit argument list.
///
/// Arguments are never re-split by a shell when run locally. When run on a
/// remote host they are rendered into a single shell line with each argument
/// quoted, see [`CommandSpec::to_shell_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run
    pub program: String,
    /// Arguments, one element per argv entry
    pub args: Vec<String>,
    /// Working directory on the target
    pub current_dir: Option<String>,
    /// Needs a terminal (stdin attached, `ssh -t` remotely)
    pub interactive: bool,
}

impl CommandSpec {
    /// Create a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            interactive: false,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value` if `value` is present.
    pub fn opt_arg(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    /// Run inside `dir` on the target.
    pub fn current_dir(mut self, dir: impl Into<String>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Mark as needing a terminal.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Whether argv starts with the given words.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        let argv = self.argv();
        argv.len() >= prefix.len() && argv.iter().zip(prefix).all(|(a, b)| a == b)
    }

    /// Single shell line for the command, every argument quoted.
    ///
    /// Includes a `cd <dir> &&` prefix when a working directory is set.
    pub fn to_shell_line(&self) -> String {
        let command = self
            .argv()
            .into_iter()
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ");
        match &self.current_dir {
            Some(dir) => format!("cd {} && {}", shell_quote(dir), command),
            None => command,
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_line())
    }
}

/// Quote a word for a POSIX shell.
///
/// Words made only of safe characters stay bare; everything else is wrapped
/// in double quotes with `\`, `"`, `$` and backtick escaped.
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return "\"\"".to_string();
    }
    if word.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '%' | ':' | ',' | '=' | '+' | '@')
    }) {
        return word.to_string();
    }
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// CommandOutput
// ============================================================================

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
    /// Whether the process exited zero
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into().into_bytes(),
            stderr: Vec::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into().into_bytes(),
            success: false,
            code: Some(code),
        }
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_strips_user() {
        assert_eq!(ExecutionTarget::Local.hostname(), "localhost");
        assert_eq!(ExecutionTarget::remote("otp1").hostname(), "otp1");
        assert_eq!(ExecutionTarget::remote("deploy@otp1.example.org").hostname(), "otp1.example.org");
    }

    #[test]
    fn test_shell_quote_bare_words() {
        assert_eq!(shell_quote("docker"), "docker");
        assert_eq!(shell_quote("80:8080"), "80:8080");
        assert_eq!(shell_quote("./otp-dockerdeploy"), "./otp-dockerdeploy");
    }

    #[test]
    fn test_shell_quote_whitespace_and_specials() {
        assert_eq!(shell_quote("a.zip b.zip"), "\"a.zip b.zip\"");
        assert_eq!(shell_quote(""), "\"\"");
        assert_eq!(shell_quote("{{.State.Pid}}"), "\"{{.State.Pid}}\"");
        assert_eq!(shell_quote("$HOME"), "\"\\$HOME\"");
        assert_eq!(shell_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(shell_quote("a;rm -rf /"), "\"a;rm -rf /\"");
    }

    #[test]
    fn test_shell_line_with_dir() {
        let spec = CommandSpec::new("docker")
            .args(["build", "-t", "opentripplanner:builder", "builder"])
            .current_dir("./otp-dockerdeploy");
        assert_eq!(
            spec.to_shell_line(),
            "cd ./otp-dockerdeploy && docker build -t opentripplanner:builder builder"
        );
    }

    #[test]
    fn test_opt_arg() {
        let spec = CommandSpec::new("x").opt_arg("-U", Some("bot/1.0")).opt_arg("-Z", None);
        assert_eq!(spec.args, vec!["-U", "bot/1.0"]);
    }

    #[test]
    fn test_starts_with() {
        let spec = CommandSpec::new("docker").args(["rm", "-f", "otpserver"]);
        assert!(spec.starts_with(&["docker", "rm"]));
        assert!(spec.starts_with(&["docker"]));
        assert!(!spec.starts_with(&["docker", "run"]));
        assert!(!spec.starts_with(&["docker", "rm", "-f", "otpserver", "extra"]));
    }

    #[test]
    fn test_output_helpers() {
        let out = CommandOutput::ok("4242\n");
        assert!(out.success);
        assert_eq!(out.stdout_str(), "4242\n");

        let out = CommandOutput::failed(125, "No such container");
        assert!(!out.success);
        assert_eq!(out.code, Some(125));
        assert_eq!(out.stderr_str(), "No such container");
    }
}
