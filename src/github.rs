use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Body of `POST /repos/{owner}/{repo}/pulls`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Body of `PATCH /repos/{owner}/{repo}/issues/{number}`
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct PullRequestPatch {
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
}

impl PullRequestPatch {
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty() && self.labels.is_empty()
    }
}

/// The parts of a created pull request we report back
#[derive(Deserialize, Debug, Clone)]
pub struct CreatedPullRequest {
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
}

/// Extract the error text from a GitHub API response, if it is one.
///
/// A non-null top-level `message` marks an error; the first entry of
/// `errors` is preferred when it carries its own `message`.
pub fn api_error(response: &Value) -> Option<String> {
    let message = response.get("message").filter(|m| !m.is_null())?;

    let detailed = response
        .get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|first| first.get("message"))
        .and_then(Value::as_str);

    match detailed {
        Some(detail) => Some(detail.to_string()),
        None => Some(match message.as_str() {
            Some(text) => text.to_string(),
            None => message.to_string(),
        }),
    }
}

/// Fail with [`Error::Api`] when `response` is a GitHub error body
pub fn check_response(response: Value) -> Result<Value> {
    match api_error(&response) {
        Some(message) => Err(Error::Api(message)),
        None => Ok(response),
    }
}

/// Quote each comma-separated word as a JSON string and join them with commas
///
/// `a,b,c` becomes `"a","b","c"`.
pub fn wrap_words_in_quotes(words: &str) -> String {
    split_list(words)
        .iter()
        .map(|w| serde_json::to_string(w).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a comma-separated flag value, dropping blank entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Open a pull request on `owner/repo`
    pub fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<CreatedPullRequest> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_url, owner, repo);
        tracing::debug!("POST {} head={} base={}", url, pr.head, pr.base);

        let response: Value = self.authorized(self.client.post(&url)).json(pr).send()?.json()?;
        let response = check_response(response)?;

        Ok(serde_json::from_value(response)?)
    }

    /// Set assignees and labels on an existing pull request
    pub fn patch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        patch: &PullRequestPatch,
    ) -> Result<Value> {
        let url = format!("{}/repos/{}/{}/issues/{}", self.api_url, owner, repo, number);
        tracing::debug!("PATCH {}", url);

        let response: Value = self
            .authorized(self.client.patch(&url))
            .json(patch)
            .send()?
            .json()?;

        check_response(response)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
    }
}
