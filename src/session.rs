//! Jira session persistence and credential sources
//!
//! A [`SessionStore`] owns the on-disk cookie file that proves an
//! authenticated Jira session. When the session is missing or expired, a
//! [`CredentialProvider`] supplies the username and password used to log in
//! again.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ui;

/// Cookies captured from a successful Jira login
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// `name=value` pairs, without attributes
    pub cookies: Vec<String>,
}

impl Session {
    /// Build a session from raw `Set-Cookie` header values, keeping only the
    /// leading `name=value` pair of each.
    pub fn from_set_cookie<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cookies = headers
            .into_iter()
            .filter_map(|h| h.split(';').next())
            .map(str::trim)
            .filter(|pair| pair.contains('='))
            .map(str::to_string)
            .collect();
        Self { cookies }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header
    pub fn cookie_header(&self) -> String {
        self.cookies.join("; ")
    }
}

/// The credential file holding the current Jira session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the stored session. A missing or unreadable file means no session.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) if !session.is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Ignoring corrupt session file {}: {}", self.path.display(), err);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = create_private(&self.path)?;
        file.write_all(serde_json::to_string_pretty(session)?.as_bytes())?;
        // mode only applies on creation; tighten files left by older runs
        restrict_permissions(&self.path)?;
        tracing::debug!("Saved Jira session to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Jira username and password
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Source of credentials for a Jira login
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials>;
}

/// Asks the user on the terminal; the password is not echoed.
#[derive(Debug, Default)]
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let username = ui::prompt_username()?;
        let password = ui::prompt_password()?;
        Ok(Credentials { username, password })
    }
}

/// Reads `JIRA_USER` and `JIRA_PASSWORD`, for non-interactive runs.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    username: String,
    password: String,
}

impl EnvCredentials {
    pub const USER_VAR: &'static str = "JIRA_USER";
    pub const PASSWORD_VAR: &'static str = "JIRA_PASSWORD";

    /// Returns `None` unless both variables are set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(Self::USER_VAR).filter(|v| !v.is_empty())?;
        let password = lookup(Self::PASSWORD_VAR).filter(|v| !v.is_empty())?;
        Some(Self { username, password })
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Environment credentials when available, otherwise an interactive prompt
pub fn default_provider() -> Box<dyn CredentialProvider> {
    match EnvCredentials::from_env() {
        Some(env) => {
            tracing::debug!("Using Jira credentials from {}", EnvCredentials::USER_VAR);
            Box::new(env)
        }
        None => Box::new(PromptCredentials),
    }
}
