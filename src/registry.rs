//! Repository registry.
//!
//! Read-only lookup of repositories known to the service, keyed by the
//! hosting service's repository id with a fallback on name. Repositories are
//! registered (and enabled or disabled) out of band; intake only ever reads.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::types::{RepoGithubId, Repository};

/// Shared handle to the registry. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    repos: Arc<RwLock<HashMap<RepoGithubId, Repository>>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        RepositoryRegistry::default()
    }

    /// Adds or replaces a repository entry.
    pub fn register(&self, repo: Repository) {
        if let Ok(mut repos) = self.repos.write() {
            repos.insert(repo.github_id, repo);
        }
    }

    /// Looks up a repository by hosting-service id, falling back to name.
    ///
    /// The name fallback covers repositories re-created on the hosting
    /// service under the same name but a new numeric id.
    pub fn lookup(&self, repo_id: RepoGithubId, repo_name: &str) -> Option<Repository> {
        let repos = self.repos.read().ok()?;
        if let Some(repo) = repos.get(&repo_id) {
            return Some(repo.clone());
        }
        repos.values().find(|r| r.name == repo_name).cloned()
    }
}
