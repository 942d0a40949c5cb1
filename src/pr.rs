use crate::github::{NewPullRequest, PullRequestPatch};
use crate::jira::Issue;

/// Represents a Pull Request about to be created
#[derive(Debug, Default, Clone)]
pub struct PullRequest {
    /// The title of the PR (e.g., "LRAC-123 Fix bug")
    pub title: String,
    /// The body of the PR, linking back to the Jira issue
    pub body: String,
    /// Source of the change, `user:branch`
    pub head: String,
    /// Owner of the repository receiving the PR
    pub base_owner: String,
    /// The base branch to merge into
    pub base: String,
    /// GitHub usernames to assign after creation
    pub assignees: Vec<String>,
    /// Labels to set after creation
    pub labels: Vec<String>,
}

impl PullRequest {
    /// Creates a new PullRequest with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill title and body from a Jira issue; `browse_url` is the issue link prefix
    pub fn from_issue(issue: &Issue, browse_url: &str) -> Self {
        Self::new()
            .with_title(title_for(issue))
            .with_body(body_for(&issue.key, browse_url))
    }

    /// Sets the title and returns self for chaining
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the body and returns self for chaining
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the head and returns self for chaining
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = head.into();
        self
    }

    /// Sets base owner and branch and returns self for chaining
    pub fn with_base(mut self, owner: impl Into<String>, branch: impl Into<String>) -> Self {
        self.base_owner = owner.into();
        self.base = branch.into();
        self
    }

    pub fn with_assignees(mut self, assignees: Vec<String>) -> Self {
        self.assignees = assignees;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Payload for the create call
    pub fn to_request(&self) -> NewPullRequest {
        NewPullRequest {
            title: self.title.clone(),
            body: self.body.clone(),
            head: self.head.clone(),
            base: self.base.clone(),
        }
    }

    /// Payload for the follow-up patch
    pub fn to_patch(&self) -> PullRequestPatch {
        PullRequestPatch {
            assignees: self.assignees.clone(),
            labels: self.labels.clone(),
        }
    }
}

pub fn title_for(issue: &Issue) -> String {
    format!("{} {}", issue.key, issue.fields.summary)
}

pub fn body_for(key: &str, browse_url: &str) -> String {
    format!("Jira Issue: [{key}]({browse_url}{key})")
}
