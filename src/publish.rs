// src/publish.rs - Optional remote issue creation
use std::fmt;
use std::str::FromStr;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{PublishError, ReportError, ReportResult};
use crate::utils::http::HttpClient;

static REPO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_.\-]+)/([A-Za-z0-9_.\-]+)$").expect("repo regex is valid")
});

/// Location of an issue created remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedIssue {
    pub url: String,
    pub number: Option<u64>,
}

/// Creates tracked issues in a remote system
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssuePublisher: Send + Sync {
    /// Create one issue. Called at most once per target, never retried.
    async fn create_issue(&self, title: &str, body: &str) -> Result<PublishedIssue, PublishError>;
}

/// `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoCoordinates {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = REPO_PATTERN.captures(s.trim()).ok_or_else(|| {
            ReportError::ConfigError(format!("Repository must look like owner/repo, got {:?}", s))
        })?;

        Ok(Self {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
        })
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatedIssue {
    html_url: Option<String>,
    number: Option<u64>,
}

/// Publisher backed by the GitHub REST issues API
pub struct GithubPublisher {
    http: HttpClient,
    issues_url: Url,
    repo: RepoCoordinates,
    token: String,
}

impl GithubPublisher {
    pub fn new(http: HttpClient, api_base: &str, repo: RepoCoordinates, token: String) -> ReportResult<Self> {
        let mut base = Url::parse(api_base)
            .map_err(|e| ReportError::ConfigError(format!("Invalid API base {:?}: {}", api_base, e)))?;

        // Url::join replaces the last segment unless the base ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let issues_url = base
            .join(&format!("repos/{}/{}/issues", repo.owner, repo.repo))
            .map_err(|e| ReportError::ConfigError(format!("Invalid issues URL: {}", e)))?;

        debug!("Publishing issues to {} as {}", issues_url, http.user_agent());

        Ok(Self {
            http,
            issues_url,
            repo,
            token,
        })
    }

    pub fn issues_url(&self) -> &Url {
        &self.issues_url
    }

    pub fn repo(&self) -> &RepoCoordinates {
        &self.repo
    }
}

#[async_trait]
impl IssuePublisher for GithubPublisher {
    async fn create_issue(&self, title: &str, body: &str) -> Result<PublishedIssue, PublishError> {
        let response = self.http
            .post_json(self.issues_url.as_str(), &NewIssue { title, body }, Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 && status.as_u16() != 201 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        let url = created
            .html_url
            .ok_or_else(|| PublishError::InvalidResponse("response has no html_url".to_string()))?;

        Ok(PublishedIssue {
            url,
            number: created.number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(api_base: &str) -> GithubPublisher {
        let http = HttpClient::new(None, Some(5)).unwrap();
        GithubPublisher::new(http, api_base, "acme/reports".parse().unwrap(), "t".to_string()).unwrap()
    }

    #[test]
    fn test_repo_coordinates() {
        let repo: RepoCoordinates = "octo-org/abuse.reports".parse().unwrap();
        assert_eq!(repo.owner, "octo-org");
        assert_eq!(repo.repo, "abuse.reports");
        assert_eq!(repo.to_string(), "octo-org/abuse.reports");

        assert!("no-slash".parse::<RepoCoordinates>().is_err());
        assert!("a/b/c".parse::<RepoCoordinates>().is_err());
        assert!("/repo".parse::<RepoCoordinates>().is_err());
    }

    #[test]
    fn test_issues_url() {
        assert_eq!(
            publisher("https://api.github.com").issues_url().as_str(),
            "https://api.github.com/repos/acme/reports/issues"
        );
        assert_eq!(
            publisher("https://ghe.example.com/api/v3").issues_url().as_str(),
            "https://ghe.example.com/api/v3/repos/acme/reports/issues"
        );
        assert_eq!(publisher("https://api.github.com/").repo().to_string(), "acme/reports");
    }

    #[test]
    fn test_invalid_api_base() {
        let http = HttpClient::new(None, None).unwrap();
        let result = GithubPublisher::new(http, "not a url", "a/b".parse().unwrap(), String::new());
        assert!(matches!(result, Err(ReportError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_mock_publisher() {
        let mut mock = MockIssuePublisher::new();
        mock.expect_create_issue()
            .times(1)
            .returning(|title, body| {
                assert_eq!(title, "t");
                assert_eq!(body, "b");
                Ok(PublishedIssue {
                    url: "https://example.com/1".to_string(),
                    number: Some(1),
                })
            });

        let issue = mock.create_issue("t", "b").await.unwrap();
        assert_eq!(issue.number, Some(1));
    }
}
