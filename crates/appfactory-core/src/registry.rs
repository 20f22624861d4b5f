//! In-memory registry of created apps.

use std::collections::HashMap;

use tokio::sync::RwLock;

use appfactory_models::AppRecord;

/// Created apps keyed by slug.
#[derive(Debug, Default)]
pub struct AppRegistry {
    apps: RwLock<HashMap<String, AppRecord>>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, making its slug unique.
    ///
    /// A taken slug gets a numeric suffix (`todo-2`, `todo-3`, ...). Returns
    /// the stored record.
    pub async fn register(&self, mut record: AppRecord) -> AppRecord {
        let mut apps = self.apps.write().await;
        let base = record.slug.clone();
        let mut n = 2;
        while apps.contains_key(&record.slug) {
            record.slug = format!("{}-{}", base, n);
            n += 1;
        }
        apps.insert(record.slug.clone(), record.clone());
        record
    }

    pub async fn get(&self, slug: &str) -> Option<AppRecord> {
        self.apps.read().await.get(slug).cloned()
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<AppRecord> {
        let mut records: Vec<AppRecord> = self.apps.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.slug.cmp(&b.slug)));
        records
    }

    /// Removes every record published to `repo_full_name`.
    pub async fn remove_by_repo(&self, repo_full_name: &str) -> usize {
        let mut apps = self.apps.write().await;
        let before = apps.len();
        apps.retain(|_, r| !r.repo_full_name.eq_ignore_ascii_case(repo_full_name));
        before - apps.len()
    }

    pub async fn len(&self) -> usize {
        self.apps.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.apps.read().await.is_empty()
    }
}
