//! Deployment options resolved from task arguments.

use thiserror::Error;

pub const DEFAULT_NAME: &str = "otpserver";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_ROUTER: &str = "default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("need at least one GTFS file (--urls a.zip,b.zip)")]
    MissingUrls,

    #[error("container name must not be empty")]
    EmptyName,

    #[error("port must be between 1 and 65535")]
    InvalidPort,
}

/// Raw task arguments, each optional.
#[derive(Debug, Clone, Default)]
pub struct GoArgs {
    pub name: Option<String>,
    pub port: Option<u16>,
    /// Comma-separated data-source URLs
    pub urls: Option<String>,
    /// Comma-separated startup parameters
    pub params: Option<String>,
    pub router: Option<String>,
    /// Comma-separated extra HTTP headers
    pub headers: Option<String>,
    pub useragent: Option<String>,
}

/// Immutable options for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOptions {
    pub name: String,
    pub urls: Vec<String>,
    pub params: Vec<String>,
    pub port: u16,
    pub router: String,
    pub headers: Vec<String>,
    pub useragent: Option<String>,
}

/// Split a comma-separated argument, trimming entries and dropping empty ones.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DeploymentOptions {
    /// Resolve defaults and validate. Fails when no URL is given, the name
    /// is blank or the port is 0.
    pub fn from_args(args: GoArgs) -> Result<Self, OptionsError> {
        let urls = split_list(args.urls.as_deref());
        if urls.is_empty() {
            return Err(OptionsError::MissingUrls);
        }
        let name = match args.name {
            Some(name) if name.trim().is_empty() => return Err(OptionsError::EmptyName),
            Some(name) => name.trim().to_string(),
            None => DEFAULT_NAME.to_string(),
        };
        let port = args.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(OptionsError::InvalidPort);
        }

        Ok(Self {
            name,
            urls,
            params: split_list(args.params.as_deref()),
            port,
            router: non_blank(args.router).unwrap_or_else(|| DEFAULT_ROUTER.to_string()),
            headers: split_list(args.headers.as_deref()),
            useragent: non_blank(args.useragent),
        })
    }

    /// URLs as one space-separated word for the builder's `-u`
    pub fn urls_arg(&self) -> String {
        self.urls.join(" ")
    }

    /// Parameters as one space-separated word for the builder's `-e`
    pub fn params_arg(&self) -> String {
        self.params.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_urls(urls: &str) -> GoArgs {
        GoArgs {
            urls: Some(urls.to_string()),
            ..GoArgs::default()
        }
    }

    #[test]
    fn test_defaults() {
        let opts = DeploymentOptions::from_args(with_urls("a.zip,b.zip")).unwrap();
        assert_eq!(opts.name, "otpserver");
        assert_eq!(opts.port, 80);
        assert_eq!(opts.router, "default");
        assert_eq!(opts.urls_arg(), "a.zip b.zip");
        assert_eq!(opts.params_arg(), "");
        assert!(opts.headers.is_empty());
        assert!(opts.useragent.is_none());
    }

    #[test]
    fn test_missing_urls() {
        assert_eq!(
            DeploymentOptions::from_args(GoArgs::default()),
            Err(OptionsError::MissingUrls)
        );
        assert_eq!(
            DeploymentOptions::from_args(with_urls("")),
            Err(OptionsError::MissingUrls)
        );
        assert_eq!(
            DeploymentOptions::from_args(with_urls(" , ,")),
            Err(OptionsError::MissingUrls)
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let args = GoArgs {
            name: Some("  ".into()),
            ..with_urls("a.zip")
        };
        assert_eq!(DeploymentOptions::from_args(args), Err(OptionsError::EmptyName));
    }

    #[test]
    fn test_port_zero_rejected() {
        let args = GoArgs {
            port: Some(0),
            ..with_urls("a.zip")
        };
        assert_eq!(DeploymentOptions::from_args(args), Err(OptionsError::InvalidPort));

        let args = GoArgs {
            port: Some(1),
            ..with_urls("a.zip")
        };
        assert_eq!(DeploymentOptions::from_args(args).unwrap().port, 1);
    }

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(split_list(Some("a.zip, b.zip,,c.zip ")), vec!["a.zip", "b.zip", "c.zip"]);
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_overrides() {
        let args = GoArgs {
            name: Some("otp-nl".into()),
            port: Some(8081),
            urls: Some("nl.zip".into()),
            params: Some("--longDistance,--analyst".into()),
            router: Some("nl".into()),
            headers: Some("X-Api-Key: k,Accept: */*".into()),
            useragent: Some("otp-bot/1.0".into()),
        };
        let opts = DeploymentOptions::from_args(args).unwrap();
        assert_eq!(opts.name, "otp-nl");
        assert_eq!(opts.port, 8081);
        assert_eq!(opts.router, "nl");
        assert_eq!(opts.params_arg(), "--longDistance --analyst");
        assert_eq!(opts.headers, vec!["X-Api-Key: k", "Accept: */*"]);
        assert_eq!(opts.useragent.as_deref(), Some("otp-bot/1.0"));
    }

    #[test]
    fn test_blank_router_falls_back() {
        let args = GoArgs {
            router: Some(" ".into()),
            useragent: Some(String::new()),
            ..with_urls("a.zip")
        };
        let opts = DeploymentOptions::from_args(args).unwrap();
        assert_eq!(opts.router, "default");
        assert!(opts.useragent.is_none());
    }
}
