use anyhow::{Context as _, Result};
use dispatchkit::Dispatcher;
use std::path::Path;

use crate::Context;
use crate::config::AppConfig;
use crate::deploy::sequence::DeployReport;
use crate::deploy::{DeploymentOptions, GoArgs, Sequencer};
use crate::ui;

/// Run the server, build the graph, restart the server, on every target.
pub fn run(ctx: &Context, args: GoArgs, build: bool) -> Result<()> {
    let work_tree = std::env::current_dir().context("Could not determine working directory")?;
    let reports = deploy(&ctx.dispatchers(), &ctx.config, &work_tree, args, build)?;
    if ctx.verbose > 0 {
        for report in &reports {
            ui::dim(&format!("{} at {}", report.name, report.url));
        }
    }
    Ok(())
}

/// Validate the arguments, then sequence each dispatcher in turn.
///
/// Returns one report per target.
pub fn deploy(
    dispatchers: &[Dispatcher],
    config: &AppConfig,
    work_tree: &Path,
    args: GoArgs,
    build: bool,
) -> Result<Vec<DeployReport>> {
    // Validate before anything is dispatched.
    let opts = DeploymentOptions::from_args(args)?;

    dispatchers
        .iter()
        .map(|d| Sequencer::new(d, config, work_tree.to_path_buf()).run(&opts, build))
        .collect()
}
