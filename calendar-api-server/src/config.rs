//! Server configuration, read once from the environment at startup.

use std::fmt;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_listen_addr() -> SocketAddr {
    DEFAULT_LISTEN_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8787)))
}

/// Repository coordinates, upstream credential and CORS policy.
///
/// Field names map to the upper-case environment variables
/// (`GH_OWNER`, `GH_REPO`, `GH_BRANCH`, `GH_TOKEN`, `GH_API_URL`,
/// `ALLOWED_ORIGIN`, `LISTEN_ADDR`).
#[derive(Deserialize, Clone)]
pub struct Config {
    pub gh_owner: String,
    pub gh_repo: String,

    #[serde(default = "default_branch")]
    pub gh_branch: String,

    pub gh_token: String,

    #[serde(default = "default_api_url")]
    pub gh_api_url: String,

    pub allowed_origin: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(source: config::Environment) -> Result<Self> {
        let config: Config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration from the environment")?
            .try_deserialize()
            .context("Missing or invalid configuration (GH_OWNER, GH_REPO, GH_TOKEN and ALLOWED_ORIGIN are required)")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("GH_OWNER", &self.gh_owner),
            ("GH_REPO", &self.gh_repo),
            ("GH_BRANCH", &self.gh_branch),
            ("GH_TOKEN", &self.gh_token),
            ("GH_API_URL", &self.gh_api_url),
            ("ALLOWED_ORIGIN", &self.allowed_origin),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", name);
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gh_owner", &self.gh_owner)
            .field("gh_repo", &self.gh_repo)
            .field("gh_branch", &self.gh_branch)
            .field("gh_token", &"<redacted>")
            .field("gh_api_url", &self.gh_api_url)
            .field("allowed_origin", &self.allowed_origin)
            .field("listen_addr", &self.listen_addr)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        gh_owner: "acme".to_string(),
        gh_repo: "calendar-data".to_string(),
        gh_branch: "main".to_string(),
        gh_token: "ghp_secret".to_string(),
        gh_api_url: DEFAULT_API_URL.to_string(),
        allowed_origin: "https://calendar.example".to_string(),
        listen_addr: default_listen_addr(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("GH_OWNER", "acme"),
        ("GH_REPO", "calendar-data"),
        ("GH_TOKEN", "ghp_secret"),
        ("ALLOWED_ORIGIN", "https://calendar.example"),
    ];

    #[test]
    fn test_load_applies_defaults() {
        let config = Config::load(env(&REQUIRED)).unwrap();

        assert_eq!(config.gh_owner, "acme");
        assert_eq!(config.gh_repo, "calendar-data");
        assert_eq!(config.gh_branch, "main");
        assert_eq!(config.gh_api_url, "https://api.github.com");
        assert_eq!(config.allowed_origin, "https://calendar.example");
        assert_eq!(config.listen_addr.port(), 8787);
    }

    #[test]
    fn test_load_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("GH_BRANCH", "calendar"));
        vars.push(("GH_API_URL", "https://ghe.example/api/v3"));
        vars.push(("LISTEN_ADDR", "127.0.0.1:9000"));

        let config = Config::load(env(&vars)).unwrap();
        assert_eq!(config.gh_branch, "calendar");
        assert_eq!(config.gh_api_url, "https://ghe.example/api/v3");
        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "GH_TOKEN")
            .collect();
        assert!(Config::load(env(&vars)).is_err());
    }

    #[test]
    fn test_empty_origin_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.retain(|(k, _)| *k != "ALLOWED_ORIGIN");
        vars.push(("ALLOWED_ORIGIN", "  "));

        let err = Config::load(env(&vars)).unwrap_err();
        assert!(err.to_string().contains("ALLOWED_ORIGIN"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
