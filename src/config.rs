use anyhow::{Context, Result};
use dispatchkit::DispatchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths;

// ============================================================================
// Main Config Schema
// ============================================================================

/// The otp-deploy configuration (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote hosts and ssh settings
    pub remote: DispatchConfig,

    /// Image names and build contexts
    pub images: ImagesConfig,

    /// Deployment sequence settings
    pub deploy: DeployConfig,

    /// Mass cleanup settings
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Image repository; roles become tags (`<repository>:builder`)
    pub repository: String,
    pub builder_context: String,
    pub server_context: String,
    pub nginx_context: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            repository: "opentripplanner".to_string(),
            builder_context: "builder".to_string(),
            server_context: "server".to_string(),
            nginx_context: "nginx".to_string(),
        }
    }
}

impl ImagesConfig {
    /// Full image reference for a role, e.g. `opentripplanner:server`
    pub fn image(&self, role: ImageRole) -> String {
        format!("{}:{}", self.repository, role.tag())
    }

    /// Build context directory for a role
    pub fn context(&self, role: ImageRole) -> &str {
        match role {
            ImageRole::Builder => &self.builder_context,
            ImageRole::Server => &self.server_context,
            ImageRole::Nginx => &self.nginx_context,
        }
    }
}

/// The images this tool builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    /// Produces the routing graph
    Builder,
    /// Serves the routing graph over HTTP
    Server,
    /// Auxiliary reverse proxy
    Nginx,
}

impl ImageRole {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Server => "server",
            Self::Nginx => "nginx",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Directory on the remote host the work tree is unpacked into
    pub remote_dir: String,

    /// Archive path, used both locally and on the remote host
    pub archive_path: String,

    /// Fixed wait after starting and after restarting the server
    pub startup_wait_secs: u64,

    /// Lines of container log shown at each checkpoint (0 = everything)
    pub log_tail_lines: usize,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            remote_dir: "./otp-dockerdeploy".to_string(),
            archive_path: "/tmp/otp-dockerdeploy.tgz".to_string(),
            startup_wait_secs: 10,
            log_tail_lines: 100,
        }
    }
}

impl DeployConfig {
    pub fn startup_wait(&self) -> Duration {
        Duration::from_secs(self.startup_wait_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Images at least this many months old are removed by `dockerrm`
    pub image_age_months: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            image_age_months: 6,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = paths::config_file()?;
                if !p.exists() {
                    log::debug!("No config at {}, using defaults", p.display());
                    return Ok(Self::default());
                }
                p
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Parse TOML config content
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in otp-deploy config")
    }

    /// Replace the configured host list (from `--hosts`).
    pub fn with_hosts(mut self, hosts: Option<Vec<String>>) -> Self {
        if let Some(hosts) = hosts {
            self.remote.hosts = hosts
                .into_iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        self
    }

    /// Expanded archive path
    pub fn archive_path(&self) -> std::path::PathBuf {
        paths::expand(&self.deploy.archive_path)
    }
}

// ============================================================================
// Tests
// ============================================================================
