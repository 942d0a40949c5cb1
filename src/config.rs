//! Configuration management for jira-pr
//!
//! Settings come from `~/.config/jira-pr/config.yaml` (every key optional) and
//! are then overridden by environment variables:
//! - `JIRA_URL`: base URL of the Jira instance
//! - `GITHUB_API_URL`: base URL of the GitHub REST API
//! - `GITHUB_USER`: GitHub login used for the default PR head
//! - `GITHUB_TOKEN`: GitHub API token

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The name of the package, used for config directory naming
const PKG_NAME: &str = "jira-pr";

pub const DEFAULT_JIRA_URL: &str = "https://issues.liferay.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jira: JiraConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub url: Option<String>,
    /// Prefix for issue links in the PR body, e.g. `https://jira.example.com/browse/`
    pub browse_url: Option<String>,
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub user: Option<String>,
    pub token: Option<String>,
}

impl Config {
    /// Load the config file at `path` (defaults if it does not exist) and
    /// apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Override file values with whatever `lookup` returns for the known
    /// environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("JIRA_URL") {
            self.jira.url = Some(url);
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_url = Some(url);
        }
        if let Some(user) = get("GITHUB_USER") {
            self.github.user = Some(user);
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
    }

    pub fn jira_url(&self) -> String {
        self.jira
            .url
            .as_deref()
            .unwrap_or(DEFAULT_JIRA_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn jira_browse_url(&self) -> String {
        match &self.jira.browse_url {
            Some(url) => url.clone(),
            None => format!("{}/browse/", self.jira_url()),
        }
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.jira.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(get_config_dir()?.join("jira-session.json")),
        }
    }

    pub fn github_api_url(&self) -> String {
        self.github
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn github_user(&self) -> Option<String> {
        self.github.user.clone().filter(|u| !u.is_empty())
    }

    pub fn github_token(&self) -> Result<String> {
        self.github
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "GitHub token not configured. Set github.token in config or GITHUB_TOKEN environment variable"
                        .into(),
                )
            })
    }
}

/// Get the configuration directory path
///
/// Returns the path to `~/.config/jira-pr/`, creating it if it doesn't exist.
pub fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("HOME environment variable not set".into()))?;
    let path = PathBuf::from(home).join(".config").join(PKG_NAME);

    ensure_config_dir_exists(&path)?;

    Ok(path)
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Ensure the configuration directory exists, creating it if necessary
pub fn ensure_config_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
