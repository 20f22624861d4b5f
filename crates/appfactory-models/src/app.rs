//! Generated applications and the records kept for published ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The source files of a generated application.
///
/// Maps a relative file path to its text content. Paths are unique and
/// iterate in lexicographic order. The set of files is fixed once the
/// value is built; there are no mutating accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedApp {
    files: BTreeMap<String, String>,
}

impl GeneratedApp {
    /// Creates an app from a path -> content map.
    pub fn new(files: BTreeMap<String, String>) -> Self {
        Self { files }
    }

    /// Returns the content of a file, if present.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Returns true if the app contains the given path.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Iterates over `(path, content)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Returns all file paths in order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if there are no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for GeneratedApp {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        }
    }
}

/// A created app: published to a repository and (maybe) deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    /// The app name as requested by the user.
    pub name: String,
    /// URL-safe identifier, unique within the registry.
    pub slug: String,
    /// Full repository name (`owner/repo`).
    pub repo_full_name: String,
    /// Browser URL of the source repository.
    pub repo_url: String,
    /// Live URL of the deployed app.
    pub deployed_url: String,
    /// Whether `deployed_url` is a placeholder rather than a real deployment.
    pub deploy_mock: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl AppRecord {
    /// Creates a record with `created_at` set to now.
    ///
    /// The slug is provisional; the registry assigns the final one.
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        repo_full_name: impl Into<String>,
        repo_url: impl Into<String>,
        deployed_url: impl Into<String>,
        deploy_mock: bool,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            repo_full_name: repo_full_name.into(),
            repo_url: repo_url.into(),
            deployed_url: deployed_url.into(),
            deploy_mock,
            created_at: Utc::now(),
        }
    }
}
