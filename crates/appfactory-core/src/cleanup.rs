//! Bulk deletion of demo repositories.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CleanupError;
use crate::github::{DeleteOutcome, GitHubClient};

/// A repository that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupFailure {
    pub repo: String,
    pub error: String,
}

/// Per-repository outcomes of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupSummary {
    pub fn total(&self) -> usize {
        self.deleted.len() + self.not_found.len() + self.failed.len()
    }
}

/// Deletes each repository in `repos`, pausing `delay` between calls.
///
/// Entries are `repo` (qualified with the configured account) or
/// `owner/repo`. Fails only when credentials are missing, before any call.
pub async fn cleanup(
    client: &GitHubClient,
    repos: &[String],
    delay: Duration,
) -> Result<CleanupSummary, CleanupError> {
    if !client.is_configured() {
        return Err(CleanupError::MissingCredentials);
    }

    info!(count = repos.len(), "Starting repository cleanup");
    let mut summary = CleanupSummary::default();

    for (i, repo) in repos.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let full_name = client.qualify(repo).unwrap_or_else(|_| repo.clone());
        match client.delete_repository(repo).await {
            Ok(DeleteOutcome::Deleted) => {
                info!(repo = %full_name, "Deleted repository");
                summary.deleted.push(full_name);
            }
            Ok(DeleteOutcome::NotFound) => {
                warn!(repo = %full_name, "Repository not found");
                summary.not_found.push(full_name);
            }
            Ok(DeleteOutcome::Failed(error)) => {
                warn!(repo = %full_name, error = %error, "Failed to delete repository");
                summary.failed.push(CleanupFailure {
                    repo: full_name,
                    error,
                });
            }
            Err(e) => {
                warn!(repo = %full_name, error = %e, "Failed to delete repository");
                summary.failed.push(CleanupFailure {
                    repo: full_name,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        deleted = summary.deleted.len(),
        not_found = summary.not_found.len(),
        failed = summary.failed.len(),
        "Repository cleanup finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> GitHubClient {
        GitHubClient::new(
            reqwest::Client::new(),
            server.url(),
            Some("t".into()),
            Some("octo".into()),
        )
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let c = GitHubClient::new(reqwest::Client::new(), "http://unused", None, None);
        let err = cleanup(&c, &["a".to_string()], Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, CleanupError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_cleanup_sorts_outcomes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/repos/octo/one")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("DELETE", "/repos/other/two")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("DELETE", "/repos/octo/three")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let repos = vec!["one".to_string(), "other/two".to_string(), "three".to_string()];
        let summary = cleanup(&client(&server), &repos, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(summary.deleted, vec!["octo/one"]);
        assert_eq!(summary.not_found, vec!["other/two"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].repo, "octo/three");
        assert_eq!(summary.failed[0].error, "500: oops");
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test]
    async fn test_delay_between_calls_only() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", mockito::Matcher::Any)
            .with_status(204)
            .expect(3)
            .create_async()
            .await;

        let repos: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let start = std::time::Instant::now();
        let summary = cleanup(&client(&server), &repos, Duration::from_millis(50))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(summary.deleted.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
