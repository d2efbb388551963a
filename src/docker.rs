//! Container engine command lines.
//!
//! Every function returns a [`CommandSpec`] with an explicit argument list;
//! nothing here runs anything.

use dispatchkit::CommandSpec;

const DOCKER: &str = "docker";

/// Port the server listens on inside its container
pub const SERVER_CONTAINER_PORT: u16 = 8080;

fn docker() -> CommandSpec {
    CommandSpec::new(DOCKER)
}

/// `docker build -t <image> <context>`
pub fn build(image: &str, context: &str) -> CommandSpec {
    docker().args(["build", "-t", image, context])
}

/// `docker images <repository>`
pub fn images(repository: &str) -> CommandSpec {
    docker().args(["images", repository])
}

/// `docker ps`
pub fn ps() -> CommandSpec {
    docker().arg("ps")
}

/// `docker rm -f <name>`
pub fn remove_force(name: &str) -> CommandSpec {
    docker().args(["rm", "-f", name])
}

/// Start the server detached: `docker run -p <port>:8080 -d --name <name> <image> --router <router> --server`
pub fn run_server(name: &str, port: u16, image: &str, router: &str) -> CommandSpec {
    docker()
        .arg("run")
        .arg("-p")
        .arg(format!("{port}:{SERVER_CONTAINER_PORT}"))
        .arg("-d")
        .args(["--name", name, image])
        .args(["--router", router, "--server"])
}

/// Arguments for one graph build run.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuild<'a> {
    /// Server container whose volumes receive the graph
    pub volumes_from: &'a str,
    pub image: &'a str,
    /// Space-separated data-source URLs
    pub urls: &'a str,
    /// Space-separated startup parameters
    pub params: &'a str,
    pub useragent: Option<&'a str>,
    pub headers: &'a [String],
}

/// Build the graph into the server's volumes:
/// `docker run --volumes-from <name> <image> -u "<urls>" -e "<params>" [-U <ua>] [-H <header>]...`
pub fn run_graph_builder(build: &GraphBuild<'_>) -> CommandSpec {
    let mut spec = docker()
        .args(["run", "--volumes-from", build.volumes_from, build.image])
        .args(["-u", build.urls, "-e", build.params])
        .opt_arg("-U", build.useragent);
    for header in build.headers {
        spec = spec.arg("-H").arg(header);
    }
    spec
}

/// `docker restart <name>`
pub fn restart(name: &str) -> CommandSpec {
    docker().args(["restart", name])
}

/// `docker logs [--tail N] <name>`; `tail == 0` shows everything
pub fn logs(name: &str, tail: usize) -> CommandSpec {
    let spec = docker().arg("logs");
    let spec = if tail > 0 {
        spec.args(["--tail".to_string(), tail.to_string()])
    } else {
        spec
    };
    spec.arg(name)
}

/// Containers with their status, one `<id>\t<status>` per line
pub fn list_containers_with_status() -> CommandSpec {
    docker().args(["ps", "--all", "--format", "{{.ID}}\t{{.Status}}"])
}

/// Images with their age, one `<id>\t<created since>` per line
pub fn list_images_with_age() -> CommandSpec {
    docker().args(["images", "--format", "{{.ID}}\t{{.CreatedSince}}"])
}

/// `docker rm <id>`
pub fn remove_container(id: &str) -> CommandSpec {
    docker().args(["rm", id])
}

/// `docker rmi <id>`
pub fn remove_image(id: &str) -> CommandSpec {
    docker().args(["rmi", id])
}

/// `docker inspect --format {{.State.Pid}} <name>`
pub fn inspect_pid(name: &str) -> CommandSpec {
    docker().args(["inspect", "--format", "{{.State.Pid}}", name])
}

/// Interactive mount-namespace session: `nsenter --target <pid> --mount`
pub fn nsenter_mount(pid: u32) -> CommandSpec {
    CommandSpec::new("nsenter")
        .arg("--target")
        .arg(pid.to_string())
        .arg("--mount")
        .interactive()
}
