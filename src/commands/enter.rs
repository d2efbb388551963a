use anyhow::{Context as _, Result, bail};
use dispatchkit::Dispatcher;

use crate::Context;
use crate::docker;

/// Attach a mount-namespace session to a running instance on every target.
pub fn run(ctx: &Context, name: &str) -> Result<()> {
    for dispatcher in ctx.dispatchers() {
        enter(&dispatcher, name)?;
    }
    Ok(())
}

/// Resolve the instance's PID, then run `nsenter` against it interactively.
pub fn enter(dispatcher: &Dispatcher, name: &str) -> Result<()> {
    let raw = dispatcher
        .capture(&docker::inspect_pid(name))
        .with_context(|| format!("Could not inspect instance {name}"))?;
    let pid: u32 = raw
        .parse()
        .with_context(|| format!("Unexpected PID for {name}: {raw:?}"))?;
    if pid == 0 {
        bail!("Instance {name} is not running");
    }
    log::info!("entering {name} (pid {pid}) on {}", dispatcher.target());
    dispatcher.run(&docker::nsenter_mount(pid))?;
    Ok(())
}
