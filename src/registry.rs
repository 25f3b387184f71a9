//! The one piece of shared mutable state in the engine (§5): a map from
//! repository name to its current [`GitHistory`]. Readers take a shared
//! lock only long enough to clone an `Arc`; the `GitHistory` behind it is
//! immutable once published, so query execution itself never blocks on
//! the registry.

use crate::error::{Error, Result};
use crate::model::GitHistory;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Readers/writer-guarded registry of named, independently rebuildable
/// histories.
#[derive(Default)]
pub struct Registry {
    repos: RwLock<HashMap<String, Arc<GitHistory>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current index for `repo`, or [`Error::UnknownRepo`] if
    /// nothing has been published under that name yet.
    pub fn get(&self, repo: &str) -> Result<Arc<GitHistory>> {
        let repos = self
            .repos
            .read()
            .expect("registry lock is never held across a panic");
        repos
            .get(repo)
            .cloned()
            .ok_or_else(|| Error::UnknownRepo(repo.to_owned()))
    }

    /// Publishes `history` under `repo`, atomically replacing whatever was
    /// registered before. In-flight queries holding an `Arc` to the old
    /// index keep running against it; new queries see `history`.
    pub fn publish(&self, repo: impl Into<String>, history: GitHistory) {
        let repo = repo.into();
        log::debug!(
            "publishing index for {repo:?}: {} commits",
            history.hashes.len()
        );
        let mut repos = self
            .repos
            .write()
            .expect("registry lock is never held across a panic");
        repos.insert(repo, Arc::new(history));
    }

    /// Removes `repo` from the registry entirely.
    pub fn remove(&self, repo: &str) {
        let mut repos = self
            .repos
            .write()
            .expect("registry lock is never held across a panic");
        repos.remove(repo);
    }
}
