//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using a
//! repository's hosting-service id where a release id is expected) and make
//! the code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The hosting service's identifier for a release.
///
/// This is the key the whole intake pipeline deduplicates on: at most one
/// release record may ever exist per `ReleaseId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(pub u64);

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ReleaseId {
    fn from(n: u64) -> Self {
        ReleaseId(n)
    }
}

/// The hosting service's numeric identifier for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoGithubId(pub u64);

impl fmt::Display for RepoGithubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RepoGithubId {
    fn from(n: u64) -> Self {
        RepoGithubId(n)
    }
}

/// A webhook delivery ID, as supplied by the sender per delivery attempt.
///
/// Redeliveries of the same logical event carry different delivery IDs, so
/// this is a tracing handle, not a dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeliveryId {
    fn from(s: String) -> Self {
        DeliveryId(s)
    }
}

impl From<&str> for DeliveryId {
    fn from(s: &str) -> Self {
        DeliveryId(s.to_string())
    }
}
