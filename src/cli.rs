use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::deploy::GoArgs;

#[derive(Parser)]
#[command(name = "otp-deploy")]
#[command(version)]
#[command(about = "Build and deploy OpenTripPlanner docker images, locally or over ssh", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Remote hosts (comma-separated); runs locally when empty
    #[arg(
        short = 'H',
        long,
        global = true,
        value_delimiter = ',',
        env = "OTP_DEPLOY_HOSTS"
    )]
    pub hosts: Option<Vec<String>>,

    /// Config file (default: ~/.config/otp-deploy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the graph builder image
    BuildBuilder,

    /// Build the server image
    BuildServer,

    /// Build the nginx image
    BuildNginx,

    /// Start the server, build the graph, then restart the server
    Go(GoCliArgs),

    /// Remove exited containers and old images
    Dockerrm {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Open a shell inside a running container
    Enter {
        /// Container name
        name: String,
    },

    /// Show the effective configuration
    Config {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: ConfigFormatArg,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct GoCliArgs {
    /// GTFS/OSM files to build the graph from (comma-separated)
    #[arg(long)]
    pub urls: Option<String>,

    /// Container name [default: otpserver]
    #[arg(long)]
    pub name: Option<String>,

    /// Host port mapped to the server [default: 80]
    #[arg(long)]
    pub port: Option<u16>,

    /// Extra graph builder parameters (comma-separated)
    #[arg(long)]
    pub params: Option<String>,

    /// Build the images before deploying
    #[arg(long)]
    pub build: bool,

    /// Router id [default: default]
    #[arg(long)]
    pub router: Option<String>,

    /// Extra HTTP headers for downloads (comma-separated)
    #[arg(long)]
    pub headers: Option<String>,

    /// User agent for downloads
    #[arg(long)]
    pub useragent: Option<String>,
}

impl GoCliArgs {
    pub fn into_parts(self) -> (GoArgs, bool) {
        let args = GoArgs {
            name: self.name,
            port: self.port,
            urls: self.urls,
            params: self.params,
            router: self.router,
            headers: self.headers,
            useragent: self.useragent,
        };
        (args, self.build)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConfigFormatArg {
    Json,
    Toml,
}
