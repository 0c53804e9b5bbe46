//! Container registry abstraction layer
//!
//! This module provides a trait-based abstraction over the registry
//! operations drclean needs, allowing a real HTTP client and an in-memory
//! mock for testing.
//!
//! # Overview
//!
//! - [client::HttpRegistry]: Docker Registry HTTP API v2 client
//! - [mock::MockRegistry]: A mock implementation for testing
//!
//! Deletion goes through [remove_tags], which resolves each tag to its
//! manifest digest and deletes by digest. Layers left unreferenced are the
//! registry's garbage collector's business.

pub mod client;
pub mod mock;

pub use client::HttpRegistry;
pub use mock::MockRegistry;

use log::{info, warn};

use crate::error::Result;

/// Registry operations used by the `next` and `prune` commands
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map transport
/// and protocol failures to [crate::error::DrcleanError] variants.
pub trait Registry: Send + Sync {
    /// List every tag of a repository (e.g., "library/alpine").
    fn list_tags(&self, repo: &str) -> Result<Vec<String>>;

    /// Resolve a tag to the content digest of its manifest.
    ///
    /// # Returns
    /// * `Ok(String)` - Digest such as `sha256:4bcff6...`
    /// * `Err` - If the tag does not exist or the registry fails
    fn manifest_digest(&self, repo: &str, tag: &str) -> Result<String>;

    /// Delete a manifest by digest. Every tag pointing at it goes with it.
    fn delete_manifest(&self, repo: &str, digest: &str) -> Result<()>;
}

/// Result of removing a single tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Removed { tag: String, digest: String },
    Failed { tag: String, reason: String },
}

impl DeletionOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, DeletionOutcome::Removed { .. })
    }
}

/// Remove tags one at a time, carrying on past individual failures.
///
/// Returns one outcome per input tag, in input order.
pub fn remove_tags<R: Registry + ?Sized, S: AsRef<str>>(
    registry: &R,
    repo: &str,
    tags: &[S],
) -> Vec<DeletionOutcome> {
    tags.iter()
        .map(|tag| {
            let tag = tag.as_ref();
            let result = registry
                .manifest_digest(repo, tag)
                .and_then(|digest| registry.delete_manifest(repo, &digest).map(|_| digest));
            match result {
                Ok(digest) => {
                    info!("removed {}:{} ({})", repo, tag, digest);
                    DeletionOutcome::Removed {
                        tag: tag.to_string(),
                        digest,
                    }
                }
                Err(e) => {
                    warn!("could not remove {}:{}: {}", repo, tag, e);
                    DeletionOutcome::Failed {
                        tag: tag.to_string(),
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}
