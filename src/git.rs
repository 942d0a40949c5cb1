use std::path::Path;

use git2::Repository;

use crate::error::{Error, Result};

/// What the tool needs to know about the local checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// File name of the working tree root, used as the GitHub repository name
    pub name: String,
    /// Short name of the checked out branch
    pub branch: String,
}

/// Inspect the repository containing `path`
pub fn repo_info<P: AsRef<Path>>(path: P) -> Result<RepoInfo> {
    let repo = Repository::discover(path).map_err(|_| Error::NotInGitRepo)?;

    let name = repo_name(&repo)?;
    let branch = current_branch(&repo)?;

    tracing::debug!("Repository {} on branch {}", name, branch);
    Ok(RepoInfo { name, branch })
}

fn repo_name(repo: &Repository) -> Result<String> {
    repo.workdir()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::Config("Repository has no working tree".into()))
}

fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(Error::DetachedHead);
    }
    head.shorthand()
        .map(str::to_string)
        .ok_or(Error::DetachedHead)
}
