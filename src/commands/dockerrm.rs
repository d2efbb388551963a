use anyhow::{Result, bail};
use dispatchkit::{CommandSpec, Dispatcher};
use regex::Regex;
use std::sync::LazyLock;

use crate::Context;
use crate::config::CleanupConfig;
use crate::docker;
use crate::prompt::{self, Confirm};
use crate::ui;

const PROMPT: &str = "Remove all exited containers and old images?";

static AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+|an?)\s+(month|year)s?\b").unwrap_or_else(|e| panic!("age pattern: {e}"))
});

/// What a cleanup removed on one target.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub containers: Vec<String>,
    pub images: Vec<String>,
}

pub fn run(ctx: &Context, yes: bool) -> Result<()> {
    let dispatchers = ctx.dispatchers();
    let mut confirm = prompt::confirmer(yes);
    match execute(&dispatchers, &ctx.config.cleanup, confirm.as_mut())? {
        Some(summaries) => {
            let containers: usize = summaries.iter().map(|s| s.containers.len()).sum();
            let images: usize = summaries.iter().map(|s| s.images.len()).sum();
            ui::success(&format!("Removed {containers} containers and {images} images"));
            if ctx.verbose > 0 {
                for summary in &summaries {
                    ui::dim(&format!("containers: {}", ui::list(&summary.containers)));
                    ui::dim(&format!("images: {}", ui::list(&summary.images)));
                }
            }
        }
        None => ui::warn("Aborted, nothing removed"),
    }
    Ok(())
}

/// Ask once, then clean every target. `None` when the user declined.
pub fn execute(
    dispatchers: &[Dispatcher],
    cleanup: &CleanupConfig,
    confirm: &mut dyn Confirm,
) -> Result<Option<Vec<CleanupSummary>>> {
    let targets: Vec<String> = dispatchers.iter().map(|d| d.target().to_string()).collect();
    let prompt = format!("{PROMPT} ({})", targets.join(", "));
    if !confirm.confirm(&prompt)? {
        return Ok(None);
    }

    dispatchers
        .iter()
        .map(|d| clean(d, cleanup))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Remove exited containers and images at least `image_age_months` old.
fn clean(dispatcher: &Dispatcher, cleanup: &CleanupConfig) -> Result<CleanupSummary> {
    ui::header(&format!("Cleaning {}", dispatcher.target()));
    let mut summary = CleanupSummary::default();

    let listing = dispatcher.capture(&docker::list_containers_with_status())?;
    summary.containers = remove_each(
        dispatcher,
        exited_containers(&listing),
        "containers",
        docker::remove_container,
    )?;

    let listing = dispatcher.capture(&docker::list_images_with_age())?;
    summary.images = remove_each(
        dispatcher,
        stale_images(&listing, cleanup.image_age_months),
        "images",
        docker::remove_image,
    )?;

    log::info!(
        "{}: removed {} containers, {} images",
        dispatcher.target(),
        summary.containers.len(),
        summary.images.len()
    );
    Ok(summary)
}

/// Try every ID, then fail once if any removal was refused.
///
/// Errors other than a non-zero exit (ssh missing, say) abort right away.
fn remove_each(
    dispatcher: &Dispatcher,
    ids: Vec<String>,
    what: &str,
    remove: fn(&str) -> CommandSpec,
) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    let mut refused = Vec::new();
    for id in ids {
        match dispatcher.run(&remove(&id)) {
            Ok(()) => removed.push(id),
            Err(e) if e.is_command_failure() => {
                log::warn!("{e}");
                refused.push(id);
            }
            Err(e) => return Err(e.into()),
        }
    }
    if !refused.is_empty() {
        bail!(
            "{}: could not remove {} {what}: {}",
            dispatcher.target(),
            refused.len(),
            refused.join(", ")
        );
    }
    Ok(removed)
}

fn rows(listing: &str) -> impl Iterator<Item = (&str, &str)> {
    listing
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(id, rest)| (id.trim(), rest.trim()))
        .filter(|(id, _)| !id.is_empty())
}

/// IDs from `<id>\t<status>` rows whose status says `Exited`.
fn exited_containers(listing: &str) -> Vec<String> {
    rows(listing)
        .filter(|(_, status)| status.contains("Exited"))
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Age in months from a "created since" phrase ("6 months ago", "About a year ago").
///
/// Anything younger than a month yields `None`.
fn age_in_months(created: &str) -> Option<u32> {
    let caps = AGE.captures(created)?;
    let count: u32 = match &caps[1] {
        n if n.eq_ignore_ascii_case("a") || n.eq_ignore_ascii_case("an") => 1,
        n => n.parse().ok()?,
    };
    if caps[2].eq_ignore_ascii_case("year") {
        count.checked_mul(12)
    } else {
        Some(count)
    }
}

/// Unique IDs from `<id>\t<created since>` rows at least `threshold` months old.
fn stale_images(listing: &str, threshold: u32) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for (id, created) in rows(listing) {
        if age_in_months(created).is_some_and(|m| m >= threshold) && !ids.iter().any(|i| i == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
