use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("HEAD is detached, check out the issue branch first")]
    DetachedHead,

    #[error("Branch name {0:?} is not a Jira issue key (e.g., LRAC-123)")]
    NotAnIssueKey(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Jira login failed: {0}")]
    LoginFailed(String),

    #[error("Jira issue {key} could not be fetched: {reason}")]
    IssueNotFound { key: String, reason: String },

    /// Error reported in the body of a GitHub API response.
    #[error("Error: {0}")]
    Api(String),

    #[error("User cancelled operation")]
    Cancelled,

    #[error("Prompt error: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, Error>;
