use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

/// Open a GitHub pull request for the Jira issue named by the current branch
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Comma-separated GitHub users to assign
    #[clap(short, long, value_parser)]
    pub assignees: Option<String>,

    /// Target of the pull request, as owner:branch
    #[clap(short, long, value_parser)]
    pub base: BaseRef,

    /// Source of the pull request [default: <github user>:<current branch>]
    #[clap(short = 'H', long, value_parser)]
    pub head: Option<String>,

    /// Comma-separated labels to set
    #[clap(short, long, value_parser)]
    pub labels: Option<String>,

    /// Print the requests instead of sending them to GitHub
    #[clap(short, long, value_parser, default_value_t = false)]
    pub dry_run: bool,

    /// Path to the config file [default: ~/.config/jira-pr/config.yaml]
    #[clap(short, long, value_parser, env = "JIRA_PR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// `owner:branch` as given to `-b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRef {
    pub owner: String,
    pub branch: String,
}

impl FromStr for BaseRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((owner, branch)) if !owner.is_empty() && !branch.is_empty() => Ok(Self {
                owner: owner.to_string(),
                branch: branch.to_string(),
            }),
            _ => Err(format!("expected owner:branch, got {:?}", s)),
        }
    }
}

impl fmt::Display for BaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.branch)
    }
}
