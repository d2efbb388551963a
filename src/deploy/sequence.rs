//! The build-graph-then-serve deployment sequence.

use anyhow::{Context, Result};
use dispatchkit::{CommandSpec, Dispatcher, OnFailure};
use std::path::PathBuf;

use super::archive;
use super::options::DeploymentOptions;
use crate::config::{AppConfig, ImageRole, ImagesConfig};
use crate::docker::{self, GraphBuild};
use crate::{progress, ui};

/// Build one image and list the repository's images for confirmation.
///
/// `dir` runs the build from that directory on the target.
pub fn build_image(
    dispatcher: &Dispatcher,
    images: &ImagesConfig,
    role: ImageRole,
    dir: Option<&str>,
) -> Result<()> {
    let in_dir = |spec: CommandSpec| match dir {
        Some(d) => spec.current_dir(d),
        None => spec,
    };
    let image = images.image(role);
    ui::info(&format!("Building {image} on {}", dispatcher.target()));
    dispatcher
        .run(&in_dir(docker::build(&image, images.context(role))))
        .with_context(|| format!("Failed to build {image}"))?;
    dispatcher.run(&in_dir(docker::images(&images.repository)))?;
    Ok(())
}

/// Outcome of a finished deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub name: String,
    pub url: String,
}

/// Runs the deployment sequence against one dispatcher.
pub struct Sequencer<'a> {
    dispatcher: &'a Dispatcher,
    config: &'a AppConfig,
    work_tree: PathBuf,
}

impl<'a> Sequencer<'a> {
    /// `work_tree` is the directory packaged and uploaded when building remotely.
    pub fn new(dispatcher: &'a Dispatcher, config: &'a AppConfig, work_tree: PathBuf) -> Self {
        Self {
            dispatcher,
            config,
            work_tree,
        }
    }

    /// Run the whole sequence. Any failure aborts immediately without cleanup,
    /// except removal of a previous instance, which is best effort.
    pub fn run(&self, opts: &DeploymentOptions, build: bool) -> Result<DeployReport> {
        let total = if build { 8 } else { 7 };
        let mut step = 0;
        let mut next = |msg: &str| {
            step += 1;
            ui::step(step, total, msg);
        };

        self.announce(opts);

        if build {
            next("Building images");
            self.build_images()?;
        }

        let name = opts.name.as_str();
        let wait = self.config.deploy.startup_wait();
        let tail = self.config.deploy.log_tail_lines;

        next(&format!("Removing previous instance {name}"));
        if !self
            .dispatcher
            .run_with(&docker::remove_force(name), OnFailure::Warn)?
        {
            ui::dim("no previous instance");
        }

        next(&format!("Starting server {name} on port {}", opts.port));
        self.dispatcher.run(&docker::run_server(
            name,
            opts.port,
            &self.config.images.image(ImageRole::Server),
            &opts.router,
        ))?;

        progress::wait(wait, "Waiting for server startup");
        next("Server log");
        self.dispatcher.run(&docker::logs(name, tail))?;

        next("Building graph");
        let urls = opts.urls_arg();
        let params = opts.params_arg();
        let builder_image = self.config.images.image(ImageRole::Builder);
        self.dispatcher
            .run(&docker::run_graph_builder(&GraphBuild {
                volumes_from: name,
                image: &builder_image,
                urls: &urls,
                params: &params,
                useragent: opts.useragent.as_deref(),
                headers: &opts.headers,
            }))
            .context("Graph build failed")?;

        next(&format!("Restarting server {name}"));
        self.dispatcher.run(&docker::restart(name))?;

        progress::wait(wait, "Waiting for server restart");
        next("Server log");
        self.dispatcher.run(&docker::logs(name, tail))?;

        next("Done");
        let url = format!(
            "http://{}:{}",
            self.dispatcher.target().hostname(),
            opts.port
        );
        ui::success(&format!("server {name} running at {url}"));

        Ok(DeployReport {
            name: name.to_string(),
            url,
        })
    }

    fn announce(&self, opts: &DeploymentOptions) {
        log::info!("Running with options {opts:?}");
        ui::header(&format!("Deploying {} to {}", opts.name, self.dispatcher.target()));
        ui::kv("urls", &ui::list(&opts.urls));
        ui::kv("params", &ui::list(&opts.params));
        ui::kv("port", &opts.port.to_string());
        ui::kv("router", &opts.router);
        ui::kv("headers", &ui::list(&opts.headers));
        ui::kv("useragent", opts.useragent.as_deref().unwrap_or("-"));
    }

    /// Build builder and server images, shipping the work tree first when remote.
    fn build_images(&self) -> Result<()> {
        let images = &self.config.images;
        if self.dispatcher.is_local() {
            build_image(self.dispatcher, images, ImageRole::Builder, None)?;
            return build_image(self.dispatcher, images, ImageRole::Server, None);
        }

        let remote_dir = self.config.deploy.remote_dir.as_str();
        let archive_path = self.config.archive_path();
        let archive_remote = self.config.deploy.archive_path.as_str();

        self.dispatcher
            .run(&CommandSpec::new("mkdir").args(["-p", remote_dir]))?;
        let files = archive::pack_tree(&self.work_tree, &archive_path).with_context(|| {
            format!("Failed to package {}", self.work_tree.display())
        })?;
        ui::dim(&format!("packed {files} files into {}", archive_path.display()));
        self.dispatcher
            .upload(&archive_path, archive_remote)
            .context("Failed to upload work tree")?;
        self.dispatcher.run(
            &CommandSpec::new("tar").args(["-C", remote_dir, "-xzf", archive_remote]),
        )?;
        self.dispatcher.run(&docker::ps())?;

        build_image(self.dispatcher, images, ImageRole::Builder, Some(remote_dir))?;
        build_image(self.dispatcher, images, ImageRole::Server, Some(remote_dir))
    }
}
