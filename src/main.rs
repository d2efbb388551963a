mod cli;
mod commands;
mod config;
mod deploy;
mod docker;
mod paths;
mod progress;
mod prompt;
#[cfg(test)]
mod testutil;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{AppConfig, ImageRole};
use dispatchkit::Dispatcher;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: AppConfig,
}

impl Context {
    /// One dispatcher per configured target.
    pub fn dispatchers(&self) -> Vec<Dispatcher> {
        Dispatcher::for_config(&self.config.remote)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let config = AppConfig::load(cli.config.as_deref())?.with_hosts(cli.hosts);
    log::debug!(
        "targets: {:?}, tunnel port {}",
        config.remote.targets(),
        config.remote.tunnel_local_port
    );

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Command::BuildBuilder => commands::images::run(&ctx, ImageRole::Builder),
        Command::BuildServer => commands::images::run(&ctx, ImageRole::Server),
        Command::BuildNginx => commands::images::run(&ctx, ImageRole::Nginx),
        Command::Go(args) => {
            let (args, build) = args.into_parts();
            commands::go::run(&ctx, args, build)
        }
        Command::Dockerrm { yes } => commands::dockerrm::run(&ctx, yes),
        Command::Enter { name } => commands::enter::run(&ctx, &name),
        Command::Config { format } => commands::config::run(&ctx, format),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "otp-deploy", &mut io::stdout());
            Ok(())
        }
    }
}
