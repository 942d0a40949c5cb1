use colored::Colorize;

use crate::cli::Args;
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::git::{self, RepoInfo};
use crate::github::{self, GitHubClient};
use crate::jira::{self, Issue, JiraClient};
use crate::pr::PullRequest;
use crate::session::{self, SessionStore};
use crate::ui;

/// Main application entry point
pub fn run(args: Args) -> Result<()> {
    ui::init_render_config();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let config = Config::load(&config_path)?;

    let repo = git::repo_info(".")?;
    if !jira::is_issue_key(&repo.branch) {
        return Err(Error::NotAnIssueKey(repo.branch));
    }
    let head = resolve_head(args.head.as_deref(), &config, &repo)?;
    let github = if args.dry_run {
        None
    } else {
        Some(GitHubClient::new(
            &config.github_api_url(),
            &config.github_token()?,
        )?)
    };

    let issue = fetch_issue(&config, &repo.branch)?;
    let pr = build_pull_request(&args, &config, &issue, head);

    match github {
        Some(github) => submit(&github, &repo, &pr),
        None => {
            print_dry_run(&config, &repo, &pr)?;
            Ok(())
        }
    }
}

/// `-H` when given, otherwise `{github user}:{current branch}`
pub fn resolve_head(head: Option<&str>, config: &Config, repo: &RepoInfo) -> Result<String> {
    if let Some(head) = head.filter(|h| !h.is_empty()) {
        return Ok(head.to_string());
    }

    let user = config.github_user().ok_or_else(|| {
        Error::Config(
            "GitHub user not configured. Set github.user in config, GITHUB_USER, or pass -H".into(),
        )
    })?;
    Ok(format!("{}:{}", user, repo.branch))
}

/// Authenticate against Jira and fetch the issue `key`
fn fetch_issue(config: &Config, key: &str) -> Result<Issue> {
    let store = SessionStore::new(config.session_path()?);
    let jira = JiraClient::new(&config.jira_url(), store)?;

    let provider = session::default_provider();
    let session = jira.ensure_session(provider.as_ref())?;
    let issue = jira.fetch_issue(&session, key)?;

    ui::info("Jira issue", &issue.key);
    ui::info("Summary", &issue.fields.summary);
    if let Some(kind) = issue.type_name() {
        ui::info("Type", kind);
    }
    Ok(issue)
}

pub fn build_pull_request(args: &Args, config: &Config, issue: &Issue, head: String) -> PullRequest {
    let list = |value: &Option<String>| {
        value
            .as_deref()
            .map(github::split_list)
            .unwrap_or_default()
    };

    PullRequest::from_issue(issue, &config.jira_browse_url())
        .with_head(head)
        .with_base(args.base.owner.clone(), args.base.branch.clone())
        .with_assignees(list(&args.assignees))
        .with_labels(list(&args.labels))
}

/// Create the PR, then patch in assignees and labels
fn submit(github: &GitHubClient, repo: &RepoInfo, pr: &PullRequest) -> Result<()> {
    ui::info("PR title", &pr.title);
    ui::info("PR base", &format!("{}:{}", pr.base_owner, pr.base));
    ui::info("PR head", &pr.head);

    let created = github.create_pull_request(&pr.base_owner, &repo.name, &pr.to_request())?;
    ui::success(&format!("Published at: {}", created.html_url.bright_cyan()));

    let patch = pr.to_patch();
    if patch.is_empty() {
        return Ok(());
    }

    print_patch_lists(pr);
    github.patch_pull_request(&pr.base_owner, &repo.name, created.number, &patch)?;
    ui::success(&format!("Updated #{}", created.number));

    Ok(())
}

fn print_dry_run(config: &Config, repo: &RepoInfo, pr: &PullRequest) -> Result<()> {
    let api = config.github_api_url();

    println!(
        "POST {}/repos/{}/{}/pulls",
        api, pr.base_owner, repo.name
    );
    println!("{}", serde_json::to_string_pretty(&pr.to_request())?);

    let patch = pr.to_patch();
    if !patch.is_empty() {
        print_patch_lists(pr);
        println!(
            "PATCH {}/repos/{}/{}/issues/<number>",
            api, pr.base_owner, repo.name
        );
        println!("{}", serde_json::to_string_pretty(&patch)?);
    }
    Ok(())
}

fn print_patch_lists(pr: &PullRequest) {
    if !pr.assignees.is_empty() {
        ui::info("Assignees", &github::wrap_words_in_quotes(&pr.assignees.join(",")));
    }
    if !pr.labels.is_empty() {
        ui::info("Labels", &github::wrap_words_in_quotes(&pr.labels.join(",")));
    }
}
