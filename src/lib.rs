//! # jira-pr
//!
//! Opens a GitHub pull request for the Jira issue named by the current branch,
//! then assigns users and labels to it.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod jira;
pub mod pr;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use pr::PullRequest;
