use anyhow::{Context as _, Result};

use crate::Context;
use crate::cli::ConfigFormatArg;
use crate::config::AppConfig;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, format: ConfigFormatArg) -> Result<()> {
    if !ctx.quiet {
        let file = paths::config_file()?;
        let status = if file.exists() { "" } else { " (not found, using defaults)" };
        ui::dim(&format!("# {}{status}", file.display()));
    }
    print!("{}", render(&ctx.config, format)?);
    Ok(())
}

/// Serialize the effective configuration.
pub fn render(config: &AppConfig, format: ConfigFormatArg) -> Result<String> {
    match format {
        ConfigFormatArg::Toml => toml::to_string_pretty(config).context("Failed to serialize TOML"),
        ConfigFormatArg::Json => serde_json::to_string_pretty(config)
            .map(|s| s + "\n")
            .context("Failed to serialize JSON"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_toml_parses_back() {
        let config = AppConfig::default().with_hosts(Some(vec!["otp1".into()]));
        let out = render(&config, ConfigFormatArg::Toml).unwrap();
        assert!(out.contains("[remote]"));
        assert!(out.contains("tunnel_local_port = 22024"));
        let parsed = AppConfig::parse(&out).unwrap();
        assert_eq!(parsed.remote.hosts, vec!["otp1"]);
    }

    #[test]
    fn test_render_json() {
        let out = render(&AppConfig::default(), ConfigFormatArg::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["images"]["repository"], "opentripplanner");
        assert_eq!(value["cleanup"]["image_age_months"], 6);
    }
}
