use anyhow::Result;

use crate::Context;
use crate::config::ImageRole;
use crate::deploy;

/// Build one image on every target.
pub fn run(ctx: &Context, role: ImageRole) -> Result<()> {
    for dispatcher in ctx.dispatchers() {
        deploy::build_image(&dispatcher, &ctx.config.images, role, None)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::{ImageRole, ImagesConfig};
    use crate::deploy::build_image;
    use crate::testutil::Harness;

    #[test]
    fn test_build_nginx_then_list() {
        let h = Harness::local();
        build_image(&h.dispatcher, &ImagesConfig::default(), ImageRole::Nginx, None).unwrap();
        assert_eq!(
            h.local.lines(),
            vec!["docker build -t opentripplanner:nginx nginx", "docker images opentripplanner"]
        );
    }

    #[test]
    fn test_build_failure_skips_listing() {
        let h = Harness::remote();
        h.remote.fail(&["docker", "build"], 1);
        let err = build_image(&h.dispatcher, &ImagesConfig::default(), ImageRole::Builder, None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to build opentripplanner:builder"));
        assert_eq!(h.remote.lines(), vec!["docker build -t opentripplanner:builder builder"]);
        assert!(h.local.calls().is_empty());
    }
}
