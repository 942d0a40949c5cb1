//! Jira integration for jira-pr
//!
//! Authenticates with a cookie session (`/rest/auth/1/session`) kept in a
//! [`SessionStore`] and fetches the issue named by the current branch.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::session::{CredentialProvider, Session, SessionStore};

lazy_static! {
    static ref ISSUE_KEY: Regex = Regex::new(r"^[A-Z][A-Z0-9_]+-\d+$").unwrap();
}

const SESSION_PATH: &str = "/rest/auth/1/session";

/// Check whether `name` looks like a Jira issue key (e.g., LRAC-123)
pub fn is_issue_key(name: &str) -> bool {
    ISSUE_KEY.is_match(name)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    pub summary: String,
    #[serde(default)]
    pub issuetype: Option<IssueType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub name: String,
}

impl Issue {
    pub fn type_name(&self) -> Option<&str> {
        self.fields.issuetype.as_ref().map(|t| t.name.as_str())
    }
}

/// First entry of a Jira `errorMessages` array, if any
pub fn first_error_message(response: &Value) -> Option<String> {
    let first = response
        .get("errorMessages")?
        .get(0)
        .filter(|m| !m.is_null())?;

    Some(match first.as_str() {
        Some(text) => text.to_string(),
        None => first.to_string(),
    })
}

pub struct JiraClient {
    client: Client,
    base_url: String,
    store: SessionStore,
}

impl JiraClient {
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Make sure a valid session is stored, logging in when there is none or
    /// the stored one has expired.
    pub fn ensure_session(&self, provider: &dyn CredentialProvider) -> Result<Session> {
        let Some(session) = self.store.load() else {
            tracing::info!("No Jira session stored, logging in");
            return self.login(provider);
        };

        if self.check_session(&session)? {
            tracing::debug!("Stored Jira session is valid");
            return Ok(session);
        }

        tracing::warn!("Jira session expired, logging in again");
        self.store.clear()?;
        self.login(provider)
    }

    /// Ask Jira whether `session` is still accepted. An `errorMessages`
    /// entry in the reply means it is not.
    pub fn check_session(&self, session: &Session) -> Result<bool> {
        let url = format!("{}{}", self.base_url, SESSION_PATH);
        tracing::debug!("GET {}", url);

        let response = self.with_session(self.client.get(&url), session).send()?;
        let status = response.status();
        let body: Value = match response.json() {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("Unparseable session check reply ({}): {}", status, err);
                return Ok(false);
            }
        };

        match first_error_message(&body) {
            Some(message) => {
                tracing::debug!("Session rejected: {}", message);
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Log in with basic auth and persist the returned cookies
    pub fn login(&self, provider: &dyn CredentialProvider) -> Result<Session> {
        let credentials = provider.credentials()?;
        let url = format!("{}{}", self.base_url, SESSION_PATH);
        tracing::debug!("POST {} as {}", url, credentials.username);

        let response = self
            .client
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()?;
        let status = response.status();

        let session = Session::from_set_cookie(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );

        if !status.is_success() || session.is_empty() {
            let reason = response
                .json::<Value>()
                .ok()
                .and_then(|body| first_error_message(&body))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(Error::LoginFailed(reason));
        }

        self.store.save(&session)?;
        tracing::info!("Logged in to Jira as {}", credentials.username);
        Ok(session)
    }

    /// Fetch summary and type of the issue `key`
    pub fn fetch_issue(&self, session: &Session, key: &str) -> Result<Issue> {
        let url = format!(
            "{}/rest/api/2/issue/{}?fields=summary,issuetype",
            self.base_url, key
        );
        tracing::debug!("GET {}", url);

        let response = self.with_session(self.client.get(&url), session).send()?;
        let status = response.status();
        let body: Value = response.json().map_err(|err| Error::IssueNotFound {
            key: key.to_string(),
            reason: format!("HTTP {}: {}", status, err),
        })?;

        if body.get("key").map_or(true, Value::is_null) {
            let reason =
                first_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(Error::IssueNotFound {
                key: key.to_string(),
                reason,
            });
        }

        Ok(serde_json::from_value(body)?)
    }

    fn with_session(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.header(COOKIE, session.cookie_header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credentials;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Hands out fixed credentials and counts how often it was asked
    struct StubCredentials {
        calls: Cell<u32>,
    }

    impl StubCredentials {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl CredentialProvider for StubCredentials {
        fn credentials(&self) -> Result<Credentials> {
            self.calls.set(self.calls.get() + 1);
            Ok(Credentials {
                username: "user".into(),
                password: "pass".into(),
            })
        }
    }

    fn client(server: &MockServer, dir: &TempDir) -> JiraClient {
        let store = SessionStore::new(dir.path().join("session.json"));
        JiraClient::new(&server.base_url(), store).unwrap()
    }

    fn stored(cookie: &str) -> Session {
        Session {
            cookies: vec![cookie.to_string()],
        }
    }

    #[test]
    fn test_issue_key_pattern() {
        assert!(is_issue_key("LRAC-123"));
        assert!(is_issue_key("LPS2-1"));
        assert!(!is_issue_key("master"));
        assert!(!is_issue_key("feature/LRAC-123"));
        assert!(!is_issue_key("lrac-123"));
    }

    #[test]
    fn test_login_persists_cookies() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/auth/1/session")
                .header("authorization", "Basic dXNlcjpwYXNz");
            then.status(200)
                .header("Set-Cookie", "JSESSIONID=fresh; Path=/; HttpOnly")
                .json_body(json!({"session": {"name": "JSESSIONID", "value": "fresh"}}));
        });

        let jira = client(&server, &dir);
        let provider = StubCredentials::new();
        let session = jira.ensure_session(&provider).unwrap();

        login.assert();
        assert_eq!(provider.calls.get(), 1);
        assert_eq!(session, stored("JSESSIONID=fresh"));
        assert_eq!(jira.store().load(), Some(stored("JSESSIONID=fresh")));
    }

    #[test]
    fn test_valid_session_skips_login() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let check = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/auth/1/session")
                .header("cookie", "JSESSIONID=old");
            then.status(200)
                .json_body(json!({"self": "x", "name": "user", "loginInfo": {}}));
        });

        let jira = client(&server, &dir);
        jira.store().save(&stored("JSESSIONID=old")).unwrap();
        let provider = StubCredentials::new();
        let session = jira.ensure_session(&provider).unwrap();

        check.assert();
        assert_eq!(provider.calls.get(), 0);
        assert_eq!(session, stored("JSESSIONID=old"));
    }

    #[test]
    fn test_expired_session_logs_in_again() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let check = server.mock(|when, then| {
            when.method(GET).path("/rest/auth/1/session");
            then.status(401).json_body(json!({
                "errorMessages": ["You are not authenticated. Authentication required to perform this operation."],
                "errors": {}
            }));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/rest/auth/1/session");
            then.status(200)
                .header("Set-Cookie", "JSESSIONID=new; Path=/")
                .json_body(json!({}));
        });

        let jira = client(&server, &dir);
        jira.store().save(&stored("JSESSIONID=old")).unwrap();
        let provider = StubCredentials::new();
        let session = jira.ensure_session(&provider).unwrap();

        check.assert();
        login.assert();
        assert_eq!(provider.calls.get(), 1);
        assert_eq!(session, stored("JSESSIONID=new"));
        assert_eq!(jira.store().load(), Some(stored("JSESSIONID=new")));
    }

    #[test]
    fn test_first_error_message() {
        assert_eq!(
            first_error_message(&json!({"errorMessages": ["Login failed"]})).as_deref(),
            Some("Login failed")
        );
        assert_eq!(
            first_error_message(&json!({"errorMessages": [{"m": "x"}]})).as_deref(),
            Some(r#"{"m":"x"}"#)
        );
        assert!(first_error_message(&json!({"errorMessages": [null]})).is_none());
        assert!(first_error_message(&json!({"errorMessages": []})).is_none());
        assert!(first_error_message(&json!({"name": "user"})).is_none());
    }

    #[test]
    fn test_non_json_session_reply_logs_in_again() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let check = server.mock(|when, then| {
            when.method(GET).path("/rest/auth/1/session");
            then.status(401)
                .header("Content-Type", "text/html")
                .body("<html><body>Session expired</body></html>");
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/rest/auth/1/session");
            then.status(200)
                .header("Set-Cookie", "JSESSIONID=new; Path=/")
                .json_body(json!({}));
        });

        let jira = client(&server, &dir);
        jira.store().save(&stored("JSESSIONID=old")).unwrap();
        let provider = StubCredentials::new();
        let session = jira.ensure_session(&provider).unwrap();

        check.assert();
        login.assert();
        assert_eq!(provider.calls.get(), 1);
        assert_eq!(session, stored("JSESSIONID=new"));
    }

    #[test]
    fn test_null_error_message_keeps_session() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let check = server.mock(|when, then| {
            when.method(GET).path("/rest/auth/1/session");
            then.status(200).json_body(json!({"errorMessages": [null]}));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/rest/auth/1/session");
            then.status(200)
                .header("Set-Cookie", "JSESSIONID=new; Path=/")
                .json_body(json!({}));
        });

        let jira = client(&server, &dir);
        jira.store().save(&stored("JSESSIONID=old")).unwrap();
        let provider = StubCredentials::new();
        let session = jira.ensure_session(&provider).unwrap();

        check.assert();
        assert_eq!(login.hits(), 0);
        assert_eq!(provider.calls.get(), 0);
        assert_eq!(session, stored("JSESSIONID=old"));
    }

    #[test]
    fn test_login_without_cookie_fails() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        server.mock(|when, then| {
            when.method(POST).path("/rest/auth/1/session");
            then.status(401).json_body(json!({
                "errorMessages": ["Login failed"],
                "errors": {}
            }));
        });

        let jira = client(&server, &dir);
        let err = jira.login(&StubCredentials::new()).unwrap_err();

        assert!(matches!(err, Error::LoginFailed(ref m) if m == "Login failed"));
        assert!(!jira.store().exists());
    }

    #[test]
    fn test_fetch_issue() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        let fetch = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/api/2/issue/LRAC-123")
                .query_param("fields", "summary,issuetype")
                .header("cookie", "JSESSIONID=abc");
            then.status(200).json_body(json!({
                "id": "10000",
                "key": "LRAC-123",
                "fields": {"summary": "Fix bug", "issuetype": {"name": "Bug"}}
            }));
        });

        let jira = client(&server, &dir);
        let issue = jira.fetch_issue(&stored("JSESSIONID=abc"), "LRAC-123").unwrap();

        fetch.assert();
        assert_eq!(issue.key, "LRAC-123");
        assert_eq!(issue.fields.summary, "Fix bug");
        assert_eq!(issue.type_name(), Some("Bug"));
    }

    #[test]
    fn test_fetch_missing_issue_reports_jira_message() {
        let server = MockServer::start();
        let dir = TempDir::new().unwrap();
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/2/issue/LRAC-999");
            then.status(404).json_body(json!({
                "errorMessages": ["Issue Does Not Exist"],
                "errors": {}
            }));
        });

        let jira = client(&server, &dir);
        let err = jira
            .fetch_issue(&stored("JSESSIONID=abc"), "LRAC-999")
            .unwrap_err();

        match err {
            Error::IssueNotFound { key, reason } => {
                assert_eq!(key, "LRAC-999");
                assert_eq!(reason, "Issue Does Not Exist");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
