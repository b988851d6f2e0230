//! Release records and their processing lifecycle.
//!
//! A [`ReleaseRecord`] is the durable trace of one admitted hosting-service
//! release. The intake layer creates records in the [`ReleaseStatus::Received`]
//! state; every later state is written by the downstream processor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ReleaseId, RepoGithubId};

/// Processing state of a release record.
///
/// Intake only ever writes `Received`. The worker moves a record to
/// `Processing` when it picks it up and to `Processed` or `Error` when the
/// downstream workflow finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    /// Admitted, waiting for the downstream processor.
    Received,
    /// Picked up by the downstream processor.
    Processing,
    /// Downstream processing finished successfully.
    Processed,
    /// Downstream processing failed.
    Error,
}

impl ReleaseStatus {
    /// Returns true once the downstream processor has finished with the record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseStatus::Processed | ReleaseStatus::Error)
    }
}

/// A known repository, as registered with the service.
///
/// Owned by the repository registry; release records reference repositories by
/// `github_id` and never own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// The hosting service's numeric repository id.
    pub github_id: RepoGithubId,

    /// The repository name, e.g. "owner/lib".
    pub name: String,

    /// Whether new releases may be admitted for this repository.
    pub enabled: bool,
}

impl Repository {
    pub fn new(github_id: impl Into<RepoGithubId>, name: impl Into<String>, enabled: bool) -> Self {
        Repository {
            github_id: github_id.into(),
            name: name.into(),
            enabled,
        }
    }
}

/// One tracked release.
///
/// At most one record exists per [`ReleaseId`]; the store's uniqueness
/// constraint enforces this across processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// The hosting service's release id (unique across all records).
    pub release_id: ReleaseId,

    /// The release tag, e.g. "v1.0.3". Informational.
    pub tag: String,

    /// The repository this release belongs to.
    pub repository: RepoGithubId,

    /// Current processing state.
    pub status: ReleaseStatus,

    /// Per-subsystem error details, populated by metadata collaborators
    /// during downstream processing. Never written by intake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, serde_json::Value>>,

    /// When the record was admitted.
    pub received_at: DateTime<Utc>,
}

impl ReleaseRecord {
    /// Creates a freshly admitted record in the `Received` state.
    pub fn received(
        release_id: impl Into<ReleaseId>,
        tag: impl Into<String>,
        repository: impl Into<RepoGithubId>,
    ) -> Self {
        ReleaseRecord {
            release_id: release_id.into(),
            tag: tag.into(),
            repository: repository.into(),
            status: ReleaseStatus::Received,
            errors: None,
            received_at: Utc::now(),
        }
    }
}
