use crate::error::{DrcleanError, Result};
use crate::registry::Registry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Mock registry for testing without network access
///
/// Tags are kept per repository in insertion order. Deleting a digest
/// removes every tag pointing at it, like a real registry.
pub struct MockRegistry {
    repos: Mutex<HashMap<String, Vec<(String, String)>>>,
    failing_digests: HashSet<String>,
    failing_listing: bool,
}

impl MockRegistry {
    /// Create a new empty mock registry
    pub fn new() -> Self {
        MockRegistry {
            repos: Mutex::new(HashMap::new()),
            failing_digests: HashSet::new(),
            failing_listing: false,
        }
    }

    /// Create a registry holding the given tags, each with its own digest
    pub fn with_tags<S: AsRef<str>>(repo: &str, tags: &[S]) -> Self {
        let mut registry = MockRegistry::new();
        for (i, tag) in tags.iter().enumerate() {
            registry.add_tag(repo, tag.as_ref(), format!("sha256:{:064x}", i + 1));
        }
        registry
    }

    /// Add a tag pointing to a digest
    pub fn add_tag(&mut self, repo: &str, tag: impl Into<String>, digest: impl Into<String>) {
        if let Ok(repos) = self.repos.get_mut() {
            repos
                .entry(repo.to_string())
                .or_default()
                .push((tag.into(), digest.into()));
        }
    }

    /// Make deletion of a digest fail
    pub fn fail_deletion_of(&mut self, digest: impl Into<String>) {
        self.failing_digests.insert(digest.into());
    }

    /// Make tag listing fail for every repository
    pub fn fail_listing(&mut self) {
        self.failing_listing = true;
    }

    /// Tags currently present in a repository
    pub fn tags_of(&self, repo: &str) -> Vec<String> {
        self.repos
            .lock()
            .map(|repos| {
                repos
                    .get(repo)
                    .map(|tags| tags.iter().map(|(tag, _)| tag.clone()).collect::<Vec<_>>())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for MockRegistry {
    fn list_tags(&self, repo: &str) -> Result<Vec<String>> {
        if self.failing_listing {
            return Err(DrcleanError::registry(format!(
                "listing tags of '{}' failed",
                repo
            )));
        }
        let repos = self
            .repos
            .lock()
            .map_err(|_| DrcleanError::registry("mock registry lock poisoned"))?;
        repos
            .get(repo)
            .map(|tags| tags.iter().map(|(tag, _)| tag.clone()).collect())
            .ok_or_else(|| DrcleanError::registry(format!("repository '{}' not found", repo)))
    }

    fn manifest_digest(&self, repo: &str, tag: &str) -> Result<String> {
        let repos = self
            .repos
            .lock()
            .map_err(|_| DrcleanError::registry("mock registry lock poisoned"))?;
        repos
            .get(repo)
            .and_then(|tags| tags.iter().find(|(t, _)| t == tag))
            .map(|(_, digest)| digest.clone())
            .ok_or_else(|| DrcleanError::registry(format!("manifest {}:{} not found", repo, tag)))
    }

    fn delete_manifest(&self, repo: &str, digest: &str) -> Result<()> {
        if self.failing_digests.contains(digest) {
            return Err(DrcleanError::registry(format!(
                "deleting {}@{} was refused",
                repo, digest
            )));
        }
        let mut repos = self
            .repos
            .lock()
            .map_err(|_| DrcleanError::registry("mock registry lock poisoned"))?;
        let tags = repos
            .get_mut(repo)
            .ok_or_else(|| DrcleanError::registry(format!("repository '{}' not found", repo)))?;
        let before = tags.len();
        tags.retain(|(_, d)| d != digest);
        if tags.len() == before {
            return Err(DrcleanError::registry(format!(
                "manifest {}@{} not found",
                repo, digest
            )));
        }
        Ok(())
    }
}
