//! GitHub repository client.
//!
//! Creates a repository per generated app, writes every file through the
//! contents API and deletes repositories during cleanup.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use appfactory_models::{slugify, GeneratedApp};

use crate::config::GitHubSettings;
use crate::error::PublishError;
use crate::http::http_client;

type Result<T> = std::result::Result<T, PublishError>;

const ACCEPT: &str = "application/vnd.github.v3+json";
const DEFAULT_BRANCH: &str = "main";

/// A repository as returned by the create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
}

/// A file that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of publishing a generated app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    pub repo: RepoRef,
    /// Paths written successfully, in write order.
    pub written: Vec<String>,
    /// Paths that failed, with the error text.
    pub failed: Vec<FileFailure>,
}

/// Result of deleting one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Failed(String),
}

/// Builds the repository name for an app: `{slug}-{caller}-{millis}`.
pub fn repo_name(app_name: &str, caller_id: &str, unix_millis: i64) -> String {
    format!("{}-{}-{}", slugify(app_name), slugify(caller_id), unix_millis)
}

/// GitHub REST API client authenticated with a personal token.
#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    username: Option<String>,
}

impl GitHubClient {
    /// Creates a client; credentials are checked per call.
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        token: Option<String>,
        username: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token,
            username,
        }
    }

    /// Creates a client from settings.
    pub fn from_settings(settings: &GitHubSettings) -> Self {
        Self::new(
            http_client(None),
            settings.api_url.clone(),
            settings.token.clone(),
            settings.username.clone(),
        )
    }

    /// Whether both token and username are configured.
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.username.is_some()
    }

    fn token(&self) -> Result<&str> {
        match (&self.token, &self.username) {
            (Some(token), Some(_)) => Ok(token),
            _ => Err(PublishError::MissingCredentials),
        }
    }

    /// Qualifies a bare repository name with the configured account.
    pub fn qualify(&self, repo: &str) -> Result<String> {
        if repo.contains('/') {
            return Ok(repo.to_string());
        }
        let owner = self
            .username
            .as_deref()
            .ok_or(PublishError::MissingCredentials)?;
        Ok(format!("{}/{}", owner, repo))
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| PublishError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PublishError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("token {}", token))
            .header("Accept", ACCEPT)
    }

    /// Creates a public repository without an initial commit.
    pub async fn create_repository(&self, name: &str, description: &str) -> Result<RepoRef> {
        let token = self.token()?;
        let url = self.url(["user", "repos"])?;
        let body = json!({
            "name": name,
            "description": description,
            "private": false,
            "auto_init": false
        });

        let response = self
            .request(Method::POST, url, token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream(response).await);
        }

        let repo: RepoRef = response.json().await?;
        info!(repo = %repo.full_name, "Created GitHub repository");
        Ok(repo)
    }

    /// Writes one file to the default branch.
    pub async fn put_file(&self, full_name: &str, path: &str, content: &str) -> Result<()> {
        let token = self.token()?;
        let url = self.url(
            ["repos"]
                .into_iter()
                .chain(full_name.split('/'))
                .chain(["contents"])
                .chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        let body = json!({
            "message": format!("Add {}", path),
            "content": BASE64.encode(content.as_bytes()),
            "branch": DEFAULT_BRANCH
        });

        let response = self
            .request(Method::PUT, url, token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream(response).await);
        }
        debug!(repo = %full_name, path = %path, "Wrote file");
        Ok(())
    }

    /// Creates a repository for `app_name` and writes every file of `app`.
    ///
    /// Individual file failures are logged and reported, not returned as
    /// errors; the remaining files are still written.
    pub async fn publish(
        &self,
        app_name: &str,
        caller_id: &str,
        app: &GeneratedApp,
    ) -> Result<PublishReport> {
        self.token()?;

        let name = repo_name(app_name, caller_id, Utc::now().timestamp_millis());
        let description = format!("A {} app created by AI via Telegram", app_name);
        let repo = self.create_repository(&name, &description).await?;

        let mut written = Vec::with_capacity(app.len());
        let mut failed = Vec::new();
        for (path, content) in app.iter() {
            match self.put_file(&repo.full_name, path, content).await {
                Ok(()) => written.push(path.to_string()),
                Err(e) => {
                    warn!(repo = %repo.full_name, path = %path, error = %e, "Failed to write file");
                    failed.push(FileFailure {
                        path: path.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            repo = %repo.full_name,
            written = written.len(),
            failed = failed.len(),
            "Published app"
        );
        Ok(PublishReport {
            repo,
            written,
            failed,
        })
    }

    /// Deletes a repository given as `repo` or `owner/repo`.
    ///
    /// Returns an error only for missing credentials; every other problem
    /// becomes [`DeleteOutcome::Failed`].
    pub async fn delete_repository(&self, repo: &str) -> Result<DeleteOutcome> {
        let token = self.token()?;
        let full_name = self.qualify(repo)?;
        let url = match self.url(["repos"].into_iter().chain(full_name.split('/'))) {
            Ok(url) => url,
            Err(e) => return Ok(DeleteOutcome::Failed(e.to_string())),
        };

        let response = match self.request(Method::DELETE, url, token).send().await {
            Ok(r) => r,
            Err(e) => return Ok(DeleteOutcome::Failed(e.to_string())),
        };

        let status = response.status();
        let outcome = if status.is_success() {
            DeleteOutcome::Deleted
        } else if status == StatusCode::NOT_FOUND {
            DeleteOutcome::NotFound
        } else {
            let body = response.text().await.unwrap_or_default();
            DeleteOutcome::Failed(format!("{}: {}", status.as_u16(), body))
        };
        Ok(outcome)
    }
}

async fn upstream(response: reqwest::Response) -> PublishError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PublishError::Upstream { status, body }
}
